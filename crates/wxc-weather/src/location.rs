use crate::types::Location;

/// Charted locations, in display order: (name, latitude, longitude)
const LOCATIONS: &[(&str, f64, f64)] = &[
    ("Blackheath", -33.6356, 150.2852),
    ("Sydney", -33.8688, 151.2093),
    ("Lithgow", -33.4811, 150.1368),
    ("Nowra", -34.8871, 150.6005),
    ("Point Perpendicular", -35.0936, 150.8053),
    ("Bungonia", -34.8573, 149.9432),
    ("Natimuk", -36.7421, 141.9413),
    ("Orange", -33.2816, 149.0862),
    ("Narooma", -36.2193, 150.1324),
    ("Byron Bay", -28.6534, 153.5334),
    ("Brisbane", -27.4705, 153.0260),
];

pub fn default_locations() -> Vec<Location> {
    LOCATIONS
        .iter()
        .map(|&(name, lat, lon)| Location::new(name, lat, lon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let locations = default_locations();
        let names: HashSet<_> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names.len(), locations.len());
    }

    #[test]
    fn test_declared_order_is_kept() {
        let locations = default_locations();
        assert_eq!(locations.first().map(|l| l.name.as_str()), Some("Blackheath"));
        assert_eq!(locations.last().map(|l| l.name.as_str()), Some("Brisbane"));
    }

    #[test]
    fn test_all_coordinates_valid() {
        assert!(default_locations().iter().all(Location::has_valid_coordinates));
    }
}
