//! Best-offer-per-destination table.

use std::collections::HashMap;

use crate::domain::FareOffer;

/// At most one offer per destination code: the cheapest seen so far.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    best: HashMap<String, FareOffer>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `offer` if its destination is new or it undercuts the stored price.
    ///
    /// Returns `true` when the table changed. Ties keep the earlier offer.
    pub fn offer(&mut self, offer: FareOffer) -> bool {
        match self.best.get(&offer.destination_code) {
            Some(current) if current.price <= offer.price => false,
            _ => {
                self.best.insert(offer.destination_code.clone(), offer);
                true
            }
        }
    }

    pub fn get(&self, destination_code: &str) -> Option<&FareOffer> {
        self.best.get(destination_code)
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Flatten to a list ordered by ascending price (then destination code).
    pub fn into_sorted_vec(self) -> Vec<FareOffer> {
        let mut out: Vec<FareOffer> = self.best.into_values().collect();
        sort_by_price(&mut out);
        out
    }
}

impl FromIterator<FareOffer> for ResultSet {
    fn from_iter<I: IntoIterator<Item = FareOffer>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for offer in iter {
            set.offer(offer);
        }
        set
    }
}

pub fn sort_by_price(offers: &mut [FareOffer]) {
    offers.sort_by(|a, b| {
        a.price
            .partial_cmp(&b.price)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.destination_code.cmp(&b.destination_code))
    });
}
