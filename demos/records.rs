//! Record-shaped dumps: declare a schema, write it, read it back.

use strata::{strata, RecordType, Result, Schema, TypeRef, Value};

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

impl Schema for Point {
    fn record() -> RecordType {
        let mut rec = RecordType::new("Demo.Point");
        rec.push_member("x", TypeRef::Scalar("int32".into()));
        rec.push_member("y", TypeRef::Scalar("int32".into()));
        rec
    }

    fn to_value(&self) -> Value {
        strata!({ "x": (self.x), "y": (self.y) })
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(Point {
            x: value.field("x")?.to_i32()?,
            y: value.field("y")?.to_i32()?,
        })
    }
}

fn main() -> Result<()> {
    let point = Point { x: 3, y: 4 };

    let text = strata::to_record_string(&point)?;
    println!("{text}");

    let back: Point = strata::from_record_str(&text)?;
    assert_eq!(back, point);
    println!("round trip ok: {back:?}");
    Ok(())
}
