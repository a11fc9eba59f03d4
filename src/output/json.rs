use super::{Formatter, StreamReport};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, report: &StreamReport) -> String {
        serde_json::to_string(report).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_report;

    #[test]
    fn test_json_format() {
        let line = JsonFormatter.format(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["stage"], "fir_12_19");
        assert_eq!(value["samples_out"], 100);
        assert_eq!(value["level"]["max"], 40.0);
    }
}
