use super::LineNumber;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line_number: LineNumber,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    pub fn in_line_number(self, line: LineNumber) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            line_number: line,
            ..self
        }
    }

    pub fn message<S: Into<String>>(self, message: S) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.into(),
            ..self
        }
    }

    pub fn category(&self) -> Category {
        self.code.category()
    }

    /// Short title used when the failure is handed to an error sink.
    pub fn kind(&self) -> &'static str {
        use ErrorCode::*;
        match self.code {
            MathError | NonFinite => "Math Error",
            StackOverflow => "Stack Overflow",
            ReturnWithoutGosub => "Return Without Gosub",
            MemoryLow => "Memory Low",
            NotFound => "Not Found",
            TooLarge => "Too Large",
            DiskNotMounted | DiskIoError => "Storage Error",
            FlashError => "Flash Error",
            InternalError => "Internal Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MathError = 2,
    ReturnWithoutGosub = 3,
    NonFinite = 6,
    MemoryLow = 7,
    StackOverflow = 10,
    TooLarge = 14,
    InternalError = 51,
    NotFound = 53,
    DiskNotMounted = 56,
    DiskIoError = 57,
    FlashError = 61,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Load,
    Eval,
    ControlFlow,
    Resource,
    Storage,
    Internal,
}

impl ErrorCode {
    pub fn category(self) -> Category {
        use ErrorCode::*;
        match self {
            NotFound | TooLarge | DiskIoError => Category::Load,
            MathError | NonFinite => Category::Eval,
            StackOverflow | ReturnWithoutGosub => Category::ControlFlow,
            MemoryLow => Category::Resource,
            DiskNotMounted | FlashError => Category::Storage,
            InternalError => Category::Internal,
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let code_str = match self.code {
            MathError => "MATH ERROR",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
            NonFinite => "RESULT NOT FINITE",
            MemoryLow => "MEMORY LOW",
            StackOverflow => "STACK OVERFLOW",
            TooLarge => "SCRIPT TOO LARGE",
            InternalError => "INTERNAL ERROR",
            NotFound => "FILE NOT FOUND",
            DiskNotMounted => "DISK NOT MOUNTED",
            DiskIoError => "DISK I/O ERROR",
            FlashError => "FLASH ERROR",
        };
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" IN {}", line_number));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        write!(f, "{}{}", code_str, suffix)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        match error.kind() {
            std::io::ErrorKind::NotFound => error!(NotFound; error.to_string()),
            _ => error!(DiskIoError; error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(error!(StackOverflow).to_string(), "STACK OVERFLOW");
        assert_eq!(
            error!(MathError, Some(12); "DIVISION BY ZERO").to_string(),
            "MATH ERROR IN 12; DIVISION BY ZERO"
        );
    }

    #[test]
    fn test_kind_and_category() {
        let e = error!(NonFinite);
        assert_eq!(e.kind(), "Math Error");
        assert_eq!(e.category(), Category::Eval);
        assert_eq!(error!(TooLarge).category(), Category::Load);
        assert_eq!(error!(MemoryLow).category(), Category::Resource);
    }
}
