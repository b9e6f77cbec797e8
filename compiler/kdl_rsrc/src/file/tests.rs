use pretty_assertions::assert_eq;

use super::*;

fn code(s: &str) -> TypeCode {
    TypeCode::new(s).unwrap()
}

#[test]
fn test_add_replaces_same_identity() {
    let mut file = ResourceFile::new();
    assert!(file.add(Resource::new(code("STR "), 128, "a", vec![1])).is_none());
    let old = file.add(Resource::new(code("STR "), 128, "b", vec![2])).unwrap();
    assert_eq!(old.name, "a");
    assert_eq!(file.len(), 1);
    assert_eq!(file.get(code("STR "), 128, &Attributes::new()).unwrap().data, vec![2]);
}

#[test]
fn test_namespaces_keep_resources_apart() {
    let mut file = ResourceFile::new();
    file.add(Resource::new(code("STR "), 128, "global", vec![]));
    file.add(Resource::new(code("STR "), 128, "nova", vec![]).in_namespace(Some("Nova")));
    assert_eq!(file.len(), 2);

    let groups = file.type_groups();
    assert_eq!(groups.len(), 2);
    assert!(groups[0].attributes.is_empty());
    assert_eq!(groups[1].resources[0].namespace(), Some("Nova"));
}

#[test]
fn test_type_groups_are_sorted() {
    let mut file = ResourceFile::new();
    file.add(Resource::new(code("snd "), 200, "", vec![]));
    file.add(Resource::new(code("PICT"), 130, "", vec![]));
    file.add(Resource::new(code("PICT"), 128, "", vec![]));

    let groups = file.type_groups();
    let layout: Vec<(String, Vec<i64>)> = groups
        .iter()
        .map(|g| (g.type_code.to_string(), g.resources.iter().map(|r| r.id).collect()))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("PICT".to_string(), vec![128, 130]),
            ("snd ".to_string(), vec![200]),
        ]
    );
}

#[test]
fn test_remove() {
    let mut file = ResourceFile::new();
    file.add(Resource::new(code("PICT"), 128, "", vec![]));
    assert!(file.remove(code("PICT"), 128, &Attributes::new()).is_some());
    assert!(file.is_empty());
}
