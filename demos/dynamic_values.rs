//! Build values with the strata! macro and control the output layout.

use strata::{strata, WriteOptions};

fn main() -> strata::Result<()> {
    let value = strata!({
        "name": "Alice",
        "address": {
            "city": "Helsinki",
            "zip": "00100"
        },
        "scores": [1, 2, 3],
        "nickname": null
    });

    println!("--- default layout\n{}", strata::to_string(&value)?);
    println!(
        "--- compact composites\n{}",
        strata::to_string_with_options(&value, &WriteOptions::compact())?
    );
    println!(
        "--- four-space indentation\n{}",
        strata::to_string_with_options(&value, &WriteOptions::new().with_indent(4))?
    );
    Ok(())
}
