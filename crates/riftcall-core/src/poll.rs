// Ordering guard for overlapping poll requests.
//
// Each poll is tagged when it is sent. A response is applied only if it is
// newer than the last applied one, so a slow response that returns after a
// later request's response is ignored instead of rolling state back.

#[derive(Debug, Default)]
pub struct PollSequencer {
    next_id: u64,
    last_applied: Option<u64>,
}

impl PollSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag for a request about to be sent.
    pub fn begin(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Whether the response to request `id` should be applied. Accepting a
    /// response marks every older request as superseded.
    pub fn accept(&mut self, id: u64) -> bool {
        match self.last_applied {
            Some(last) if id <= last => false,
            _ => {
                self.last_applied = Some(id);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_order_responses_all_apply() {
        let mut seq = PollSequencer::new();
        let a = seq.begin();
        let b = seq.begin();
        assert!(seq.accept(a));
        assert!(seq.accept(b));
    }

    #[test]
    fn late_response_is_ignored() {
        let mut seq = PollSequencer::new();
        let a = seq.begin();
        let b = seq.begin();
        let c = seq.begin();
        assert!(seq.accept(c));
        assert!(!seq.accept(a));
        assert!(!seq.accept(b));
    }

    #[test]
    fn duplicate_response_is_ignored() {
        let mut seq = PollSequencer::new();
        let a = seq.begin();
        assert!(seq.accept(a));
        assert!(!seq.accept(a));
    }
}
