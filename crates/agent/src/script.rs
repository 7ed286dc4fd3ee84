//! Demo scripts — fixed lists of user turns played against a session.

use std::path::Path;

/// The built-in demo conversation for the sales assistant persona.
pub const DEMO_SCRIPT: &[&str] = &[
    "Hola, ¿qué tarjetas de crédito ofrecen?",
    "¿Cuáles son los beneficios de la Tarjeta Oro?",
    "¿Qué requisitos necesito para solicitar la Tarjeta Platino?",
    "¿Hay alguna promoción vigente con la Tarjeta Clásica?",
    "¿Cuántas tarjetas he vendido hoy?",
    "¿Cuál es mi meta de ventas diaria?",
    "¿Me puedes recordar mi número de vendedor y sucursal?",
    "¿Qué pasa si un cliente no cumple con todos los requisitos?",
    "¿Cuál es la tasa de interés de la Tarjeta Black?",
    "¿Qué promociones hay en hoteles con la tarjeta platino?",
    "¿Me podrías ayudar a manejar la objeción de un cliente que no quiere la tarjeta por la anualidad?",
    "¿Cómo puedo aumentar mis ventas este mes?",
];

/// The built-in script as owned strings.
pub fn demo_script() -> Vec<String> {
    DEMO_SCRIPT.iter().map(|s| s.to_string()).collect()
}

/// Parse a script: one input per line; blank lines and `#` comments are skipped.
pub fn parse_script(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read and parse a script file.
pub fn load_script(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_script(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_script_has_twelve_turns() {
        assert_eq!(DEMO_SCRIPT.len(), 12);
        assert_eq!(demo_script()[0], "Hola, ¿qué tarjetas de crédito ofrecen?");
    }

    #[test]
    fn parse_skips_blanks_and_comments() {
        let text = "\n# saludo\nHola\n   \n  ¿Meta diaria?  \n#fin\n";
        assert_eq!(parse_script(text), vec!["Hola", "¿Meta diaria?"]);
    }

    #[test]
    fn parse_empty_text() {
        assert!(parse_script("").is_empty());
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(load_script(Path::new("/nonexistent/script.txt")).is_err());
    }
}
