use netdissect::*;

#[test]
fn mac_addr_display() {
    let mac = MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    assert_eq!("aa:bb:cc:dd:ee:ff", format!("{}", mac));
    let mac = MacAddr([0, 1, 2, 3, 4, 5]);
    assert_eq!("00:01:02:03:04:05", format!("{}", mac));
}

#[test]
fn record_preserves_insertion_order() {
    let mut record = Record::new();
    record.push("zeta", Value::Int(1));
    record.push("alpha", Value::Int(2));
    record.push("mu", Value::Int(3));
    let names: Vec<&str> = record.names().collect();
    assert_eq!(vec!["zeta", "alpha", "mu"], names);
    let values: Vec<u64> = record.iter().map(|(_, v)| v.as_int().unwrap()).collect();
    assert_eq!(vec![1, 2, 3], values);
}

#[test]
fn record_get() {
    let mut record = Record::new();
    record.push("a", Value::Text("x".to_string()));
    record.push("b", Value::Null);
    assert_eq!(Some("x"), record.get("a").and_then(Value::as_text));
    assert!(record.get("b").unwrap().is_null());
    assert_eq!(None, record.get("c"));
    assert!(record.contains("a"));
    assert!(!record.contains("c"));
    assert_eq!(2, record.len());
    assert!(!record.is_empty());
}

#[test]
fn record_get_mut() {
    let mut record = Record::new();
    record.push("list", Value::List(vec![Value::Int(1)]));
    if let Some(Value::List(values)) = record.get_mut("list") {
        values.push(Value::Int(2));
    }
    assert_eq!(
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)])),
        record.get("list")
    );
}

#[test]
fn value_accessors() {
    assert_eq!(Some(7), Value::Int(7).as_int());
    assert_eq!(None, Value::Bool(true).as_int());
    assert_eq!(Some(true), Value::Bool(true).as_bool());
    assert_eq!(Some("x"), Value::Text("x".to_string()).as_text());
    assert_eq!(
        Some(&[1u8, 2][..]),
        Value::Bytes(vec![1, 2]).as_bytes()
    );
    assert!(Value::Record(Record::new()).as_record().is_some());
    assert!(Value::List(Vec::new()).as_list().is_some());
    assert!(Value::Null.is_null());
    assert!(!Value::Int(0).is_null());
}

#[test]
fn structural_equality_includes_field_order() {
    let mut a = Record::new();
    a.push("x", Value::Int(1));
    a.push("y", Value::Int(2));
    let mut b = Record::new();
    b.push("y", Value::Int(2));
    b.push("x", Value::Int(1));
    assert_ne!(a, b);

    let mut c = Record::new();
    c.push("x", Value::Int(1));
    c.push("y", Value::Int(2));
    assert_eq!(a, c);
}
