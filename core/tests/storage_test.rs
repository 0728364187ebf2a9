use casa_core::storage::{Storage, CF_TEMPERATURE, CF_USERS};
use casa_core::CasaError;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Doc {
    n: u32,
}

#[test]
fn put_get_delete() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path()).unwrap();

    storage.put(CF_USERS, "a", &Doc { n: 1 }).unwrap();
    assert_eq!(storage.get::<Doc>(CF_USERS, "a").unwrap(), Some(Doc { n: 1 }));
    // collections are separate
    assert_eq!(storage.get::<Doc>(CF_TEMPERATURE, "a").unwrap(), None);

    storage.delete(CF_USERS, "a").unwrap();
    assert_eq!(storage.get::<Doc>(CF_USERS, "a").unwrap(), None);
}

#[test]
fn scan_prefix_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path()).unwrap();

    storage
        .batch_put(
            CF_TEMPERATURE,
            vec![
                ("x/1".to_string(), Doc { n: 1 }),
                ("x/2".to_string(), Doc { n: 2 }),
                ("y/1".to_string(), Doc { n: 3 }),
            ],
        )
        .unwrap();

    let xs = storage.scan_prefix::<Doc>(CF_TEMPERATURE, "x/").unwrap();
    assert_eq!(
        xs,
        vec![("x/1".to_string(), Doc { n: 1 }), ("x/2".to_string(), Doc { n: 2 })]
    );
    assert_eq!(storage.scan::<Doc>(CF_TEMPERATURE).unwrap().len(), 3);

    assert_eq!(storage.clear(CF_TEMPERATURE).unwrap(), 3);
    assert!(storage.scan::<Doc>(CF_TEMPERATURE).unwrap().is_empty());
}

#[test]
fn unknown_collection_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path()).unwrap();

    assert!(matches!(
        storage.put("nope", "k", &Doc { n: 0 }),
        Err(CasaError::StorageError(_))
    ));
}
