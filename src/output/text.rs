use super::{Formatter, StreamReport};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &StreamReport) -> String {
        let mut line = format!(
            "{}: {} /{} -> {} of {} samples ({} -> {} Hz)",
            report.input,
            report.stage,
            report.decimation_factor,
            report.samples_out,
            report.samples_in,
            report.input_rate,
            report.output_rate
        );
        if self.verbose {
            let level = report.level.as_ref().map_or("-".to_string(), |l| {
                format!(
                    "mean {:.1} sd {:.1} range {:.0}..{:.0}",
                    l.mean, l.std_dev, l.min, l.max
                )
            });
            line.push_str(&format!(
                " [blocks: {}, {:.2} ms, level: {}]",
                report.blocks, report.elapsed_ms, level
            ));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_report;

    #[test]
    fn test_text_format() {
        let line = TextFormatter::new(false).format(&sample_report());
        assert_eq!(
            line,
            "capture.wav: fir_12_19 /6 -> 100 of 600 samples (12000000 -> 2000000 Hz)"
        );
    }

    #[test]
    fn test_text_format_verbose() {
        let line = TextFormatter::new(true).format(&sample_report());
        assert!(line.ends_with("[blocks: 3, 1.50 ms, level: mean 12.5 sd 2.0 range 3..40]"));
    }
}
