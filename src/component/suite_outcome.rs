/// 一次選單操作中測試執行的統計，用來決定程式結束碼
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SuiteOutcome {
    pub runs_attempted: usize,
    pub runs_with_samples: usize,
}

impl SuiteOutcome {
    pub fn record(&mut self, collected_samples: bool) {
        self.runs_attempted += 1;
        if collected_samples {
            self.runs_with_samples += 1;
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.runs_attempted += other.runs_attempted;
        self.runs_with_samples += other.runs_with_samples;
    }

    /// 有執行過測試但從未收集到任何樣本時回傳 1
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.runs_attempted > 0 && self.runs_with_samples == 0 {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code() {
        let mut outcome = SuiteOutcome::default();
        assert_eq!(outcome.exit_code(), 0);

        outcome.record(false);
        outcome.record(false);
        assert_eq!(outcome.exit_code(), 1);

        let mut later = SuiteOutcome::default();
        later.record(true);
        outcome.merge(later);
        assert_eq!(outcome.runs_attempted, 3);
        assert_eq!(outcome.exit_code(), 0);
    }
}
