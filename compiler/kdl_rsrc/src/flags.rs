//! Flags stored in encoded resource references.

use bitflags::bitflags;

bitflags! {
    /// Leading byte of an `RSRC` field in the extended and rez encodings.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ReferenceFlags: u8 {
        /// A PSTR namespace follows the flags.
        const NAMESPACE = 1 << 0;
        /// A four-byte type code follows the namespace.
        const TYPE = 1 << 1;
    }
}
