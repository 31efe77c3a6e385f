//! Record lifecycle tests for the passport contract

use passport_chaincode::{MockStub, PassportContract};
use passport_common::{Error, HistoryEntry, Person, PersonArgs};

fn igor() -> Person {
    Person {
        id: "person0".to_string(),
        serial: "0510 228148".to_string(),
        name: "Igor".to_string(),
        surname: "Nikolaev".to_string(),
        city: "Moscow".to_string(),
        address: "Likhachevsky proezd 2".to_string(),
        phone: "88005553535".to_string(),
        married: true,
    }
}

fn person(id: &str) -> Person {
    Person {
        id: id.to_string(),
        serial: format!("serial-{}", id),
        name: "Anna".to_string(),
        surname: "Petrova".to_string(),
        city: "Kazan".to_string(),
        address: "Baumana 1".to_string(),
        phone: "123".to_string(),
        married: false,
    }
}

fn create(
    stub: &mut MockStub,
    contract: &PassportContract,
    p: &Person,
) -> passport_common::Result<Vec<u8>> {
    let args = PersonArgs(p.clone()).to_args();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    stub.invoke(contract, "CreatePerson", &args)
}

fn update(
    stub: &mut MockStub,
    contract: &PassportContract,
    p: &Person,
) -> passport_common::Result<Vec<u8>> {
    let args = PersonArgs(p.clone()).to_args();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    stub.invoke(contract, "UpdatePerson", &args)
}

fn read(
    stub: &mut MockStub,
    contract: &PassportContract,
    id: &str,
) -> passport_common::Result<Person> {
    let payload = stub.invoke(contract, "ReadPerson", &[id])?;
    Person::from_bytes(&payload)
}

fn exists(stub: &mut MockStub, contract: &PassportContract, id: &str) -> bool {
    let payload = stub.invoke(contract, "PersonExists", &[id]).unwrap();
    serde_json::from_slice(&payload).unwrap()
}

fn history(
    stub: &mut MockStub,
    contract: &PassportContract,
    id: &str,
) -> passport_common::Result<Vec<HistoryEntry>> {
    let payload = stub.invoke(contract, "GetPersonHistory", &[id])?;
    Ok(serde_json::from_slice(&payload)?)
}

#[test]
fn test_create_then_read_returns_input() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();

    let payload = create(&mut stub, &contract, &person("p1")).unwrap();
    assert!(payload.is_empty());

    assert_eq!(read(&mut stub, &contract, "p1").unwrap(), person("p1"));
}

#[test]
fn test_duplicate_create_fails_without_mutation() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();
    create(&mut stub, &contract, &person("p1")).unwrap();

    let mut changed = person("p1");
    changed.name = "Someone else".to_string();
    let err = create(&mut stub, &contract, &changed).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(id) if id == "p1"));

    assert_eq!(read(&mut stub, &contract, "p1").unwrap(), person("p1"));
    assert_eq!(history(&mut stub, &contract, "p1").unwrap().len(), 1);
}

#[test]
fn test_missing_ids_are_not_found() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();

    assert!(matches!(
        update(&mut stub, &contract, &person("ghost")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        stub.invoke(&contract, "DeletePerson", &["ghost"]),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        history(&mut stub, &contract, "ghost"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        read(&mut stub, &contract, "ghost"),
        Err(Error::NotFound(_))
    ));
    assert!(stub.is_empty());
}

#[test]
fn test_delete_then_read_and_exists() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();
    create(&mut stub, &contract, &person("p1")).unwrap();

    stub.invoke(&contract, "DeletePerson", &["p1"]).unwrap();

    assert!(matches!(read(&mut stub, &contract, "p1"), Err(Error::NotFound(_))));
    assert!(!exists(&mut stub, &contract, "p1"));
}

#[test]
fn test_history_is_guarded_after_delete() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();
    create(&mut stub, &contract, &person("p1")).unwrap();
    stub.invoke(&contract, "DeletePerson", &["p1"]).unwrap();

    assert!(matches!(
        history(&mut stub, &contract, "p1"),
        Err(Error::NotFound(_))
    ));

    // Re-created keys expose the whole log, deletion included
    create(&mut stub, &contract, &person("p1")).unwrap();
    let entries = history(&mut stub, &contract, "p1").unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[1].is_delete());
    assert_eq!(entries[2].data.as_ref(), Some(&person("p1")));
}

#[test]
fn test_list_all() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();

    let payload = stub.invoke(&contract, "GetAllPersons", &[]).unwrap();
    let persons: Vec<Person> = serde_json::from_slice(&payload).unwrap();
    assert!(persons.is_empty());

    let ids = ["p3", "p1", "p2"];
    for id in ids {
        create(&mut stub, &contract, &person(id)).unwrap();
    }

    let payload = stub.invoke(&contract, "GetAllPersons", &[]).unwrap();
    let mut persons: Vec<Person> = serde_json::from_slice(&payload).unwrap();
    assert_eq!(persons.len(), ids.len());

    persons.sort_by(|a, b| a.id.cmp(&b.id));
    persons.dedup_by(|a, b| a.id == b.id);
    assert_eq!(persons, vec![person("p1"), person("p2"), person("p3")]);
    assert_eq!(stub.open_cursors(), 0);
}

#[test]
fn test_history_counts_every_update() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();
    let mut p = person("p1");
    create(&mut stub, &contract, &p).unwrap();

    let mut expected = vec![p.clone()];
    for k in 0..4 {
        p.phone = format!("555-000{}", k);
        p.married = k % 2 == 0;
        update(&mut stub, &contract, &p).unwrap();
        expected.push(p.clone());
    }

    let entries = history(&mut stub, &contract, "p1").unwrap();
    assert_eq!(entries.len(), 5);
    for pair in entries.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    let data: Vec<Person> = entries.into_iter().filter_map(|e| e.data).collect();
    assert_eq!(data, expected);
    assert_eq!(stub.open_cursors(), 0);
}

#[test]
fn test_igor_scenario() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();

    create(&mut stub, &contract, &igor()).unwrap();
    assert!(exists(&mut stub, &contract, "person0"));
    assert_eq!(read(&mut stub, &contract, "person0").unwrap(), igor());

    let mut updated = igor();
    updated.serial = "9999".to_string();
    update(&mut stub, &contract, &updated).unwrap();
    assert_eq!(read(&mut stub, &contract, "person0").unwrap().serial, "9999");

    let entries = history(&mut stub, &contract, "person0").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].data.as_ref(), Some(&igor()));
    assert_eq!(entries[1].data.as_ref(), Some(&updated));
    assert_ne!(entries[0].tx, entries[1].tx);
}

#[test]
fn test_init_ledger_seeds_once() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();

    stub.invoke(&contract, "InitLedger", &[]).unwrap();
    assert_eq!(stub.len(), 2);
    assert_eq!(read(&mut stub, &contract, "person0").unwrap(), igor());
    assert!(!read(&mut stub, &contract, "person1").unwrap().married);

    let err = stub.invoke(&contract, "InitLedger", &[]).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));
    assert_eq!(history(&mut stub, &contract, "person1").unwrap().len(), 1);
}

#[test]
fn test_init_ledger_refuses_partial_seed() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();
    let mut existing = person("person1");
    existing.name = "Kept".to_string();
    create(&mut stub, &contract, &existing).unwrap();

    assert!(stub.invoke(&contract, "InitLedger", &[]).is_err());
    assert!(!exists(&mut stub, &contract, "person0"));
    assert_eq!(read(&mut stub, &contract, "person1").unwrap().name, "Kept");
}

#[test]
fn test_corrupt_state_is_fatal_and_releases_cursor() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();
    create(&mut stub, &contract, &person("p1")).unwrap();
    stub.put_raw("p2", b"not json".to_vec());
    create(&mut stub, &contract, &person("p3")).unwrap();

    let err = stub.invoke(&contract, "GetAllPersons", &[]).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
    assert_eq!(stub.open_cursors(), 0);
}

#[test]
fn test_argument_validation() {
    let contract = PassportContract::new();
    let mut stub = MockStub::new();

    let err = stub.invoke(&contract, "UpdateAsset", &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownFunction(_)));

    let err = stub.invoke(&contract, "ReadPerson", &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = stub
        .invoke(
            &contract,
            "CreatePerson",
            &["p1", "s", "n", "sn", "c", "a", "ph", "maybe"],
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(stub.is_empty());
}
