use super::{Formatter, StreamReport};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &StreamReport) -> String {
        let (mean, max) = report.level.as_ref().map_or((String::new(), String::new()), |l| {
            (format!("{:.2}", l.mean), format!("{:.0}", l.max))
        });
        format!(
            "{},{},{},{},{},{},{},{:.3},{},{}",
            report.ts,
            report.input,
            report.stage,
            report.decimation_factor,
            report.samples_in,
            report.samples_out,
            report.blocks,
            report.elapsed_ms,
            mean,
            max
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,input,stage,decimation_factor,samples_in,samples_out,blocks,elapsed_ms,mean,max")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_report;

    #[test]
    fn test_csv_matches_header() {
        let formatter = CsvFormatter;
        let line = formatter.format(&sample_report());
        let header = formatter.header().unwrap();
        assert_eq!(line.split(',').count(), header.split(',').count());
        assert!(line.ends_with(",12.50,40"));
    }
}
