//! Textual export of property trees
//!
//! Renders a tree in an indented block syntax:
//!
//! ```text
//!   name = "web"
//!   ports = [80,443]
//!   listener {
//!     protocol = "tcp"
//!   }
//! ```
//!
//! Each record element becomes its own `key { ... }` block. Null values and
//! empty collections are skipped.

use crate::encoder::Encoder;
use crate::error::Result;
use crate::property::Record;
use crate::value::{PropertyTree, Value};
use std::io::Write;

const INDENT: &str = "  ";

/// Render a tree to a string
pub fn render(tree: &PropertyTree) -> String {
    let mut out = Vec::new();
    // writing into a Vec<u8> cannot fail
    let _ = write_tree(tree, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Write a tree to `w`
pub fn write_tree(tree: &PropertyTree, w: &mut dyn Write) -> Result<()> {
    write_entries(tree, w, INDENT)
}

/// Encode a record with default settings and write it to `w`
pub fn export<T: Record>(value: &T, w: &mut dyn Write) -> Result<()> {
    let tree = Encoder::default().encode(value)?;
    write_tree(&tree, w)
}

fn write_entries(tree: &PropertyTree, w: &mut dyn Write, indent: &str) -> Result<()> {
    for (key, value) in tree {
        write_entry(key, value, w, indent)?;
    }
    Ok(())
}

fn write_entry(key: &str, value: &Value, w: &mut dyn Write, indent: &str) -> Result<()> {
    match value {
        Value::Null => {}
        Value::List(items) if items.is_empty() => {}
        Value::Set(set) if set.is_empty() => {}
        Value::List(items) if items.iter().all(|item| matches!(item, Value::Map(_))) => {
            for item in items {
                if let Value::Map(nested) = item {
                    write_block(key, nested, w, indent)?;
                }
            }
        }
        Value::Map(nested) => write_block(key, nested, w, indent)?,
        other => writeln!(w, "{}{} = {}", indent, key, serde_json::to_string(other)?)?,
    }
    Ok(())
}

fn write_block(key: &str, tree: &PropertyTree, w: &mut dyn Write, indent: &str) -> Result<()> {
    writeln!(w, "{}{} {{", indent, key)?;
    write_entries(tree, w, &format!("{}{}", indent, INDENT))?;
    writeln!(w, "{}}}", indent)?;
    Ok(())
}
