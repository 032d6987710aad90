//! JSON/text output helpers

use std::io::Write;

use serde::Serialize;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Write `data` wrapped in the `{"ok": true, "data": ...}` envelope
pub fn print_json<T: Serialize>(out: &mut dyn Write, data: T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(&JsonOut { ok: true, data })?;
    writeln!(out, "{}", rendered)?;
    Ok(())
}

/// Either the JSON envelope or the text produced by `row`
pub fn print_one<T: Serialize>(
    out: &mut dyn Write,
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        print_json(out, data)
    } else {
        writeln!(out, "{}", row(&data))?;
        Ok(())
    }
}
