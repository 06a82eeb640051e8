use chrono::NaiveDate;
use parking_lot::Mutex;

struct Ledger {
    day: Option<NaiveDate>,
    spent_usd: f64,
}

/// Daily spend ceiling for provider calls; the ledger resets when the day changes.
pub struct SpendGuard {
    daily_budget_usd: f64,
    ledger: Mutex<Ledger>,
}

impl SpendGuard {
    pub fn new(daily_budget_usd: f64) -> Self {
        Self {
            daily_budget_usd,
            ledger: Mutex::new(Ledger {
                day: None,
                spent_usd: 0.0,
            }),
        }
    }

    pub fn allows(&self, day: NaiveDate) -> bool {
        self.spent_on(day) < self.daily_budget_usd
    }

    pub fn record(&self, day: NaiveDate, cost_usd: f64) {
        let mut ledger = self.ledger.lock();
        if ledger.day != Some(day) {
            ledger.day = Some(day);
            ledger.spent_usd = 0.0;
        }
        ledger.spent_usd += cost_usd.max(0.0);
    }

    pub fn spent_on(&self, day: NaiveDate) -> f64 {
        let ledger = self.ledger.lock();
        if ledger.day == Some(day) {
            ledger.spent_usd
        } else {
            0.0
        }
    }
}
