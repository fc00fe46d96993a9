//! Lookup key generation

/// Issues `HotelLookup` keys for one run
///
/// A single generator is created per run and lent to the city stage and then
/// the hotel stage, so keys are unique across both. The first key issued is
/// `"2"`, matching the numbering of earlier loads.
#[derive(Debug, Clone)]
pub struct LookupKeys {
    last: u64,
    issued: u64,
}

impl Default for LookupKeys {
    fn default() -> Self {
        Self::starting_after(1)
    }
}

impl LookupKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose first key is `last + 1`
    pub fn starting_after(last: u64) -> Self {
        Self { last, issued: 0 }
    }

    /// Next unused key
    pub fn next_key(&mut self) -> String {
        self.last += 1;
        self.issued += 1;
        self.last.to_string()
    }

    /// Number of keys handed out
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Most recently issued value
    pub fn last(&self) -> u64 {
        self.last
    }
}
