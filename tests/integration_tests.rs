use strata::{strata, ErrorKind, Registry, TypeRef, Value, WriteOptions};

#[test]
fn nested_maps_by_indentation() {
    let text = "\
name: demo
server
  host: localhost
  port: 8080
";
    let doc = strata::from_str(text).unwrap();
    assert_eq!(doc.get("name").unwrap().text().unwrap(), "demo");
    let server = doc.get("server").unwrap();
    assert_eq!(server.get("host").unwrap().text().unwrap(), "localhost");
    assert_eq!(server.get("port").unwrap().to_u16().unwrap(), 8080);
}

#[test]
fn dedent_closes_open_containers() {
    let text = "\
a
  b
    c: 1
  d: 2
e: 3
";
    let doc = strata::from_str(text).unwrap();
    let a = doc.get("a").unwrap();
    assert_eq!(a.get("b").unwrap().get("c").unwrap().to_i32().unwrap(), 1);
    assert_eq!(a.get("d").unwrap().to_i32().unwrap(), 2);
    assert_eq!(doc.get("e").unwrap().to_i32().unwrap(), 3);
    // insertion order is preserved
    let keys: Vec<&str> = doc.root().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "e"]);
}

#[test]
fn lists_mix_scalars_and_inline_composites() {
    let text = "\
items
  - 1
  - {x: 1, y: 2}
  - (a, b)
";
    let doc = strata::from_str(text).unwrap();
    let items = doc.get("items").unwrap();
    assert_eq!(items.at(0).unwrap().to_i32().unwrap(), 1);
    assert_eq!(items.at(1).unwrap().get("y").unwrap().to_i32().unwrap(), 2);
    assert_eq!(items.at(2).unwrap().at(1).unwrap().text().unwrap(), "b");
    assert!(items.at(3).is_none());
}

#[test]
fn list_items_can_open_maps() {
    let text = "\
rows
  - sku: A1
    n: 2
  - sku: B2
    n: 3
";
    let doc = strata::from_str(text).unwrap();
    let rows = doc.get("rows").unwrap();
    assert_eq!(
        rows.at(0).unwrap().get("sku").unwrap().text().unwrap(),
        "A1"
    );
    assert_eq!(rows.at(1).unwrap().get("n").unwrap().to_i32().unwrap(), 3);
}

#[test]
fn null_reference_parses_and_writes() {
    let doc = strata::from_str("gone: %null\nkept: 1").unwrap();
    assert!(doc.get("gone").unwrap().is_null());
    let text = strata::to_string(&doc.into_value()).unwrap();
    assert_eq!(text, "gone: %null\nkept: 1\n");
}

#[test]
fn records_declared_by_the_input() {
    let text = "\
$struct Demo.Point
  int32 x
  int32 y
$struct Demo.Line
  Demo.Point a
  Demo.Point b
[Demo.Line] seg
  - (1, 2)
  - (3, 4)
";
    let doc = strata::from_str(text).unwrap();
    let names: Vec<&str> = doc.records().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Demo.Point", "Demo.Line"]);
    assert_eq!(doc.record("Demo.Point").unwrap().len(), 2);

    let seg = doc.get("seg").unwrap();
    assert_eq!(seg.get("a").unwrap().get("x").unwrap().to_i32().unwrap(), 1);
    assert_eq!(seg.get("b").unwrap().get("y").unwrap().to_i32().unwrap(), 4);
}

#[test]
fn generic_members_and_native_registry() {
    let mut point = strata::RecordType::new("Demo.Point");
    point.push_member("x", TypeRef::Scalar("int32".into()));
    point.push_member("y", TypeRef::Scalar("int32".into()));
    let mut registry = Registry::new();
    registry.add_record(point);
    registry.add_enum("Demo.Rank");

    let text = "\
$struct Demo.Article
  string title
  Demo.Rank rank
  list[ int32 ] scores
  map[ string Demo.Point ] pins
[Demo.Article] root
  - \"Hello, world\"
  - Gold
  - (1, 2, 3)
  - {origin: (0, 0)}
";
    let doc = strata::from_str_with_registry(text, &registry).unwrap();
    let root = doc.get("root").unwrap();
    assert_eq!(root.get("title").unwrap().text().unwrap(), "Hello, world");
    assert_eq!(root.get("rank").unwrap().text().unwrap(), "Gold");
    assert_eq!(
        root.get("scores").unwrap().at(2).unwrap().to_i32().unwrap(),
        3
    );
    let origin = root.get("pins").unwrap().get("origin").unwrap();
    assert_eq!(origin.get("y").unwrap().to_i32().unwrap(), 0);
}

#[test]
fn null_members_in_record_typed_lists() {
    let text = "\
$struct Demo.Article
  string content
  int32 count
[Demo.Article] root
  - %null
  - 1
";
    let doc = strata::from_str(text).unwrap();
    let root = doc.get("root").unwrap();
    assert!(root.get("content").unwrap().is_null());
    assert_eq!(root.get("count").unwrap().to_i32().unwrap(), 1);
}

#[test]
fn wrong_member_count_is_a_shape_error() {
    let text = "\
$struct Demo.Point
  int32 x
  int32 y
[Demo.Point] p
  - 1
";
    let err = strata::from_str(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataShape);
}

#[test]
fn too_many_members_is_a_shape_error() {
    let text = "\
$struct Demo.Point
  int32 x
  int32 y
[Demo.Point] p
  - 1
  - 2
  - 3
";
    let err = strata::from_str(text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataShape);
}

#[test]
fn conversions_are_on_demand() {
    let doc = strata::from_str("a: 1.23").unwrap();
    let a = doc.get("a").unwrap();
    assert_eq!(a.to_f64().unwrap(), 1.23);
    assert_eq!(a.to_i32().unwrap_err().kind(), ErrorKind::Conversion);
}

#[test]
fn primitive_boundaries() {
    let text = "\
i16max: 32767
u64big: 9223372036854775808
neg: -1.23
hello: \"P\\xc3\\xa4iv\\xc3\\xa4\\xc3\\xa4\"
t: True
f: false
c: a
";
    let doc = strata::from_str(text).unwrap();
    assert_eq!(doc.get("i16max").unwrap().to_i16().unwrap(), 32767);
    assert!(doc.get("u64big").unwrap().to_i64().is_err());
    assert_eq!(
        doc.get("u64big").unwrap().to_u64().unwrap(),
        9223372036854775808
    );
    assert_eq!(doc.get("neg").unwrap().to_f64().unwrap(), -1.23);
    assert_eq!(doc.get("hello").unwrap().text().unwrap(), "Päivää");
    assert!(doc.get("t").unwrap().to_bool().unwrap());
    assert!(!doc.get("f").unwrap().to_bool().unwrap());
    assert_eq!(doc.get("c").unwrap().to_char().unwrap(), 'a');
}

#[test]
fn blank_lines_are_skipped() {
    let doc = strata::from_str("a: 1\n\n   \nb: 2\n").unwrap();
    assert_eq!(doc.root().len(), 2);
}

#[test]
fn empty_input_is_an_empty_document() {
    let doc = strata::from_str("").unwrap();
    assert!(doc.root().is_empty());
    assert_eq!(doc.records().count(), 0);
}

#[test]
fn unassigned_top_level_name_is_a_grammar_error() {
    let err = strata::from_str("a\nb: 1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert!(err.to_string().contains("unassigned name"));
}

#[test]
fn trailing_bare_key_is_dropped() {
    let doc = strata::from_str("a: 1\nb").unwrap();
    assert_eq!(doc.root().len(), 1);
    assert!(doc.get("b").is_none());
}

#[test]
fn write_then_reparse_is_identity() {
    let text = "\
name: demo
server
  host: localhost
  port: 8080
tags
  - a
  - b
point: {x: 1, y: 2}
empty: {}
none: %null
";
    let first = strata::from_str(text).unwrap();
    let written = strata::to_string(&first.clone().into_value()).unwrap();
    let second = strata::from_str(&written).unwrap();
    assert_eq!(first.root(), second.root());
}

#[test]
fn quoted_keys_round_trip() {
    let first = strata::from_str("m: {\"two words\": 1}").unwrap();
    let written = strata::to_string(&first.clone().into_value()).unwrap();
    assert_eq!(written, "m\n  \"two words\": 1\n");
    let second = strata::from_str(&written).unwrap();
    assert_eq!(first.root(), second.root());
    assert_eq!(
        second
            .get("m")
            .unwrap()
            .get("two words")
            .unwrap()
            .to_i32()
            .unwrap(),
        1
    );
}

#[test]
fn quoted_key_opens_a_block() {
    let doc = strata::from_str("\"a-b\"\n  x: 1\n\"1.5\": 2\n").unwrap();
    assert_eq!(
        doc.get("a-b").unwrap().get("x").unwrap().to_i32().unwrap(),
        1
    );
    assert_eq!(doc.get("1.5").unwrap().to_i32().unwrap(), 2);
}

#[test]
fn compact_write_reparses_too() {
    let value = strata!({
        "point": { "x": 1, "y": 2 },
        "tags": ["a", "b c"]
    });
    let written = strata::to_string_with_options(&value, &WriteOptions::compact()).unwrap();
    let doc = strata::from_str(&written).unwrap();
    assert_eq!(Value::Map(doc.into_root()), value);
}

#[test]
fn from_reader_matches_from_str() {
    let text = "a: 1\nb: two";
    let doc = strata::from_reader(text.as_bytes()).unwrap();
    assert_eq!(doc.get("b").unwrap().text().unwrap(), "two");
}

#[test]
fn from_file_streams() {
    let path = std::env::temp_dir().join("strata_integration_from_file.strata");
    std::fs::write(&path, "a: 1\nnested\n  b: 2\n").unwrap();
    let doc = strata::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(
        doc.get("nested")
            .unwrap()
            .get("b")
            .unwrap()
            .to_i32()
            .unwrap(),
        2
    );
}

#[test]
fn to_writer_into_a_file_sink() {
    let path = std::env::temp_dir().join("strata_integration_to_writer.strata");
    let value = strata!({ "a": 1 });
    let mut sink = strata::FileSink::create(&path).unwrap();
    strata::to_writer(&value, &mut sink, &WriteOptions::new()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(text, "a: 1\n");
}
