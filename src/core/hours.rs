use std::collections::BTreeMap;

const HOUR_LABELS: [(&str, &str); 24] = [
    ("00", "12 AM"),
    ("01", "1 AM"),
    ("02", "2 AM"),
    ("03", "3 AM"),
    ("04", "4 AM"),
    ("05", "5 AM"),
    ("06", "6 AM"),
    ("07", "7 AM"),
    ("08", "8 AM"),
    ("09", "9 AM"),
    ("10", "10 AM"),
    ("11", "11 AM"),
    ("12", "12 PM"),
    ("13", "1 PM"),
    ("14", "2 PM"),
    ("15", "3 PM"),
    ("16", "4 PM"),
    ("17", "5 PM"),
    ("18", "6 PM"),
    ("19", "7 PM"),
    ("20", "8 PM"),
    ("21", "9 PM"),
    ("22", "10 PM"),
    ("23", "11 PM"),
];

/// Zero-padded hour -> 12-hour clock label, e.g. "13" -> "1 PM".
pub fn build_hour_label_map() -> BTreeMap<String, String> {
    HOUR_LABELS
        .iter()
        .map(|(hour, label)| (hour.to_string(), label.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_covers_every_hour() {
        let map = build_hour_label_map();
        assert_eq!(map.len(), 24);
        for hour in 0..24u8 {
            assert!(map.contains_key(&format!("{:02}", hour)));
        }
    }

    #[test]
    fn test_labels_follow_twelve_hour_clock() {
        let map = build_hour_label_map();
        for (hour, label) in &map {
            let h: u8 = hour.parse().unwrap();
            let suffix = if h < 12 { "AM" } else { "PM" };
            let clock = match h % 12 {
                0 => 12,
                n => n,
            };
            assert_eq!(label, &format!("{} {}", clock, suffix));
        }
        assert_eq!(map["00"], "12 AM");
        assert_eq!(map["11"], "11 AM");
        assert_eq!(map["12"], "12 PM");
        assert_eq!(map["13"], "1 PM");
    }
}
