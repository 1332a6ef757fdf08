/// A fatal script failure as handed to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: String,
    /// One-based.
    pub line_number: usize,
    pub raw_line: String,
    /// `raw_line` with bound variables replaced by their values.
    pub expanded_line: String,
    pub detail: String,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}: {} [{}]",
            self.kind, self.line_number, self.raw_line, self.expanded_line
        )
    }
}

pub trait ErrorSink {
    fn report(&mut self, report: &Report);
}

impl ErrorSink for Vec<Report> {
    fn report(&mut self, report: &Report) {
        self.push(report.clone());
    }
}
