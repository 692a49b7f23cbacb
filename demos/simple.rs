//! Parse a small document, read values out, and write it back.

fn main() -> strata::Result<()> {
    let text = "\
name: demo
server
  host: localhost
  port: 8080
tags
  - alpha
  - beta
";

    let doc = strata::from_str(text)?;
    println!("name = {}", doc.field("name")?.text()?);
    println!("port = {}", doc.field("server")?.field("port")?.to_u16()?);
    for tag in doc.field("tags")?.as_list().into_iter().flatten() {
        println!("tag: {}", tag.text()?);
    }

    let round_tripped = strata::to_string(&doc.into_value())?;
    println!("---\n{round_tripped}");
    Ok(())
}
