//! Offside-rule and malformed-input behavior, end to end.

use strata::{ErrorKind, Registry, TypeRef};

fn kind_of(text: &str) -> ErrorKind {
    strata::from_str(text).unwrap_err().kind()
}

#[test]
fn shrunken_indentation_must_match_an_open_level() {
    let err = strata::from_str("a\n  - 1\n - 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Indentation);
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn tabs_and_spaces_are_not_interchangeable() {
    assert_eq!(kind_of("a\n\tb: 1\n  c: 2"), ErrorKind::Indentation);
}

#[test]
fn deeper_indentation_needs_an_open_container() {
    assert_eq!(kind_of("a: 1\n  b: 2"), ErrorKind::Indentation);
}

#[test]
fn a_whole_run_of_whitespace_is_one_new_level() {
    // any first indentation width works, as long as later lines repeat it
    let doc = strata::from_str("a\n      b: 1\n      c: 2").unwrap();
    assert_eq!(
        doc.get("a").unwrap().get("c").unwrap().to_i32().unwrap(),
        2
    );
}

#[test]
fn open_bracket_at_line_end_is_lexical() {
    assert_eq!(kind_of("a: (1, 2"), ErrorKind::Lexical);
    assert_eq!(kind_of("a: {x: 1"), ErrorKind::Lexical);
}

#[test]
fn stray_closing_bracket_is_lexical() {
    assert_eq!(kind_of("a: 1)"), ErrorKind::Lexical);
}

#[test]
fn value_lines_reject_trailing_tokens() {
    assert_eq!(kind_of("a: 1 2"), ErrorKind::Grammar);
}

#[test]
fn composite_cannot_start_a_line() {
    assert_eq!(kind_of("(1, 2)"), ErrorKind::Grammar);
}

#[test]
fn unknown_reference_is_grammar() {
    let err = strata::from_str("a: %nil").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert!(err.to_string().contains("%nil"));
}

#[test]
fn unknown_directive_is_grammar() {
    assert_eq!(kind_of("$record Demo.P"), ErrorKind::Grammar);
}

#[test]
fn directive_must_start_at_the_first_column() {
    assert_eq!(kind_of("a\n  $struct Demo.P"), ErrorKind::Indentation);
}

#[test]
fn record_member_depth_is_exactly_one() {
    assert_eq!(
        kind_of("$struct Demo.P\n  int32 x\n    int32 y"),
        ErrorKind::Indentation
    );
}

#[test]
fn record_redeclaration_is_grammar() {
    assert_eq!(
        kind_of("$struct Demo.P\n  int32 x\n$struct Demo.P\n  int32 y"),
        ErrorKind::Grammar
    );
}

#[test]
fn unknown_member_type_is_grammar() {
    let err = strata::from_str("$struct Demo.P\n  widget x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Grammar);
    assert!(err.to_string().contains("widget"));
}

#[test]
fn unknown_record_in_typed_key_is_grammar() {
    assert_eq!(kind_of("[Demo.Missing] p\n  - 1"), ErrorKind::Grammar);
}

#[test]
fn input_records_shadow_registry_records() {
    let mut native = strata::RecordType::new("Demo.Point");
    native.push_member("x", TypeRef::Scalar("int32".into()));
    native.push_member("y", TypeRef::Scalar("int32".into()));
    let mut registry = Registry::new();
    registry.add_record(native);

    let text = "\
$struct Demo.Point
  string label
[Demo.Point] p
  - hi
";
    let doc = strata::from_str_with_registry(text, &registry).unwrap();
    let p = doc.get("p").unwrap();
    assert_eq!(p.get("label").unwrap().text().unwrap(), "hi");
    assert!(p.get("x").is_none());
}

#[test]
fn record_identity_is_structural() {
    let a = {
        let mut rec = strata::RecordType::new("A");
        rec.push_member("x", TypeRef::Scalar("int32".into()));
        rec.push_member("y", TypeRef::Scalar("int32".into()));
        rec
    };
    let b = {
        let mut rec = strata::RecordType::new("B");
        rec.push_member("y", TypeRef::Scalar("int32".into()));
        rec.push_member("x", TypeRef::Scalar("int32".into()));
        rec
    };
    assert!(a.matches(&b));
    assert_eq!(
        TypeRef::Record(a.into()),
        TypeRef::Record(b.into())
    );
}

#[test]
fn lexical_errors_name_the_state_and_line() {
    let err = strata::from_str("ok: 1\nbad: \"un\\qterminated").unwrap_err();
    let text = err.to_string();
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert!(text.contains("line 2"), "{text}");
    assert!(text.contains("escape"), "{text}");
}

#[test]
fn grammar_errors_carry_the_offending_line() {
    let err = strata::from_str("ok: 1\nbad: 1 2").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("line 2"), "{text}");
    assert!(text.contains("bad: 1 2"), "{text}");
}
