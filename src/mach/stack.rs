use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Bounded call stack
///
/// Holds GOSUB return addresses. Pushing onto a full stack is refused and
/// the frames already held stay untouched.
#[derive(Debug)]
pub struct Stack<T> {
    frames: Vec<T>,
    limit: usize,
    too_deep: &'static str,
}

impl<T> Stack<T> {
    pub fn new(limit: usize, too_deep: &'static str) -> Stack<T> {
        Stack {
            frames: Vec::with_capacity(limit.min(64)),
            limit,
            too_deep,
        }
    }

    pub fn capacity(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.limit
    }

    pub fn top(&self) -> Option<&T> {
        self.frames.last()
    }

    pub fn push(&mut self, frame: T) -> Result<()> {
        if self.is_full() {
            return Err(error!(StackOverflow; self.too_deep));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T> {
        self.frames.pop().ok_or_else(|| error!(ReturnWithoutGosub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_push_at_capacity_leaves_stack_intact() {
        let mut stack: Stack<usize> = Stack::new(2, "GOSUB");
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert!(stack.is_full());
        let err = stack.push(3).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StackOverflow);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top(), Some(&2));
    }

    #[test]
    fn test_pop_empty() {
        let mut stack: Stack<usize> = Stack::new(4, "GOSUB");
        assert_eq!(stack.pop().unwrap_err().code(), ErrorCode::ReturnWithoutGosub);
        stack.push(7).unwrap();
        assert_eq!(stack.pop().unwrap(), 7);
        assert!(stack.is_empty());
    }
}
