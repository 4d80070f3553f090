use alloc::{
    collections::{BTreeMap, btree_map::Entry},
    vec::Vec,
};

use super::{Bssid, NetworkRecord};

/// Networks keyed by BSSID, keeping the strongest sighting of each.
#[derive(Clone, Debug, Default)]
pub struct ResultSet {
    by_bssid: BTreeMap<Bssid, NetworkRecord>,
}

impl ResultSet {
    pub const fn new() -> Self {
        Self {
            by_bssid: BTreeMap::new(),
        }
    }

    /// Adds `record` unless a sighting of the same BSSID with equal or
    /// stronger signal is already present.
    pub fn merge(&mut self, record: NetworkRecord) {
        match self.by_bssid.entry(record.bssid()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.rssi() > slot.get().rssi() {
                    slot.insert(record);
                }
            }
        }
    }

    pub fn merge_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = NetworkRecord>,
    {
        for record in records {
            self.merge(record);
        }
    }

    pub fn len(&self) -> usize {
        self.by_bssid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bssid.is_empty()
    }

    pub fn get(&self, bssid: Bssid) -> Option<&NetworkRecord> {
        self.by_bssid.get(&bssid)
    }

    pub fn into_records(self) -> Vec<NetworkRecord> {
        self.by_bssid.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bssid: u8, channel: u8, rssi: i8) -> NetworkRecord {
        NetworkRecord::new(b"ssid", Bssid([bssid; 6]), channel, rssi, 3)
    }

    #[test]
    fn stronger_duplicate_replaces_existing() {
        let mut set = ResultSet::new();
        set.merge(record(0xBB, 1, -70));
        set.merge(record(0xBB, 6, -35));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Bssid([0xBB; 6])).map(NetworkRecord::rssi), Some(-35));
        assert_eq!(set.get(Bssid([0xBB; 6])).map(NetworkRecord::channel), Some(6));
    }

    #[test]
    fn weaker_duplicate_is_ignored() {
        let mut set = ResultSet::new();
        set.merge(record(0xBB, 6, -35));
        set.merge(record(0xBB, 1, -70));

        assert_eq!(set.get(Bssid([0xBB; 6])).map(NetworkRecord::channel), Some(6));
    }

    #[test]
    fn equal_strength_keeps_first_sighting() {
        let mut set = ResultSet::new();
        set.merge(record(0xCC, 1, -50));
        set.merge(record(0xCC, 11, -50));

        assert_eq!(set.get(Bssid([0xCC; 6])).map(NetworkRecord::channel), Some(1));
    }

    #[test]
    fn distinct_bssids_are_all_kept() {
        let mut set = ResultSet::new();
        set.merge_all([record(1, 1, -30), record(2, 6, -40), record(3, 11, -50)]);

        assert_eq!(set.into_records().len(), 3);
    }
}
