use std::io::Write;

/// Prompt and read one line from stdin. `None` at end of input.
pub fn readline() -> Result<Option<String>, String> {
    write!(std::io::stdout(), "narrator> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
