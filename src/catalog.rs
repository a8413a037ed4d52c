/// The POI classes the sprite sheet has to cover, and the icons we already know for them.
///
/// Order matters: manual resolution walks the types in this order.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    poi_types: &'a [&'a str],
    defaults: &'a [(&'a str, &'a str)],
}

impl<'a> Catalog<'a> {
    pub const fn new(poi_types: &'a [&'a str], defaults: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            poi_types,
            defaults,
        }
    }

    /// The catalog shipped with the tile server
    pub const fn builtin() -> Catalog<'static> {
        Catalog::new(ALL_POI_TYPES, DEFAULT_ICONS)
    }

    pub fn poi_types(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.poi_types.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.poi_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poi_types.is_empty()
    }

    /// returns the default icon name for a poi type, if there is one
    pub fn default_icon(&self, poi_type: &str) -> Option<&'a str> {
        self.defaults
            .iter()
            .find(|(ty, _)| *ty == poi_type)
            .map(|(_, icon)| *icon)
    }

    pub fn has_default(&self, poi_type: &str) -> bool {
        self.default_icon(poi_type).is_some()
    }
}

pub const ALL_POI_TYPES: &[&str] = &[
    // food & drink
    "restaurant",
    "cafe",
    "fast_food",
    "bar",
    "pub",
    "biergarten",
    "ice_cream",
    // health
    "pharmacy",
    "hospital",
    "clinic",
    "doctors",
    "dentist",
    "veterinary",
    "nursing_home",
    // services
    "bank",
    "atm",
    "bureau_de_change",
    "post_office",
    "post_box",
    "police",
    "fire_station",
    "townhall",
    "courthouse",
    "embassy",
    "community_centre",
    "social_facility",
    "library",
    "telephone",
    "toilets",
    "drinking_water",
    "waste_basket",
    "recycling",
    "vending_machine",
    // education & culture
    "kindergarten",
    "school",
    "college",
    "university",
    "place_of_worship",
    "cinema",
    "theatre",
    "museum",
    "arts_centre",
    // transport
    "parking",
    "bicycle_parking",
    "bicycle_rental",
    "car_rental",
    "boat_rental",
    "fuel",
    "charging_station",
    "bus_station",
    "bus_stop",
    "railway_station",
    "tram_stop",
    "subway_entrance",
    "ferry_terminal",
    "airport",
    "taxi",
    // tourism
    "hotel",
    "hostel",
    "guest_house",
    "motel",
    "alpine_hut",
    "camp_site",
    "picnic_site",
    "information",
    "viewpoint",
    "attraction",
    "zoo",
    "aquarium",
    "theme_park",
    "castle",
    "monument",
    "memorial",
    "ruins",
    "peak",
    // leisure
    "park",
    "playground",
    "dog_park",
    "sports_centre",
    "fitness_centre",
    "swimming_pool",
    "water_park",
    "golf_course",
    "stadium",
    "slipway",
    "hunting_stand",
    // shops
    "supermarket",
    "convenience",
    "bakery",
    "butcher",
    "kiosk",
    "marketplace",
    "mall",
    "clothes",
    "shoes",
    "hairdresser",
    "florist",
    "books",
    "electronics",
    "mobile_phone",
    "hardware",
    "doityourself",
    "furniture",
    "optician",
    "jewelry",
    "gift",
    "laundry",
    "car_repair",
    "car_wash",
    "bicycle",
    "lottery",
    "tanning_salon",
];

pub const DEFAULT_ICONS: &[(&str, &str)] = &[
    ("restaurant", "utensils"),
    ("cafe", "mug-hot"),
    ("fast_food", "burger"),
    ("bar", "martini-glass"),
    ("pub", "beer-mug-empty"),
    ("biergarten", "beer-mug-empty"),
    ("ice_cream", "ice-cream"),
    ("pharmacy", "prescription-bottle"),
    ("hospital", "hospital"),
    ("clinic", "house-medical"),
    ("doctors", "user-doctor"),
    ("dentist", "tooth"),
    ("veterinary", "paw"),
    ("nursing_home", "person-cane"),
    ("bank", "building-columns"),
    ("atm", "money-bill"),
    ("post_office", "envelope"),
    ("post_box", "envelope-open-text"),
    ("police", "building-shield"),
    ("fire_station", "fire-extinguisher"),
    ("townhall", "landmark"),
    ("courthouse", "gavel"),
    ("embassy", "flag"),
    ("community_centre", "people-roof"),
    ("social_facility", "hand-holding-heart"),
    ("library", "book"),
    ("telephone", "phone"),
    ("toilets", "restroom"),
    ("drinking_water", "faucet-drip"),
    ("waste_basket", "trash-can"),
    ("recycling", "recycle"),
    ("kindergarten", "children"),
    ("school", "school"),
    ("college", "graduation-cap"),
    ("university", "graduation-cap"),
    ("place_of_worship", "place-of-worship"),
    ("cinema", "film"),
    ("theatre", "masks-theater"),
    ("museum", "landmark-dome"),
    ("arts_centre", "palette"),
    ("parking", "square-parking"),
    ("bicycle_parking", "bicycle"),
    ("bicycle_rental", "bicycle"),
    ("car_rental", "car"),
    ("fuel", "gas-pump"),
    ("charging_station", "charging-station"),
    ("bus_station", "bus"),
    ("bus_stop", "bus-simple"),
    ("railway_station", "train"),
    ("tram_stop", "train-tram"),
    ("subway_entrance", "train-subway"),
    ("ferry_terminal", "ferry"),
    ("airport", "plane"),
    ("taxi", "taxi"),
    ("hotel", "hotel"),
    ("hostel", "bed"),
    ("guest_house", "house"),
    ("motel", "bed"),
    ("alpine_hut", "mountain"),
    ("camp_site", "campground"),
    ("information", "circle-info"),
    ("viewpoint", "binoculars"),
    ("attraction", "star"),
    ("zoo", "hippo"),
    ("aquarium", "fish"),
    ("castle", "chess-rook"),
    ("monument", "monument"),
    ("memorial", "monument"),
    ("ruins", "dungeon"),
    ("peak", "mountain"),
    ("park", "tree"),
    ("playground", "child-reaching"),
    ("dog_park", "dog"),
    ("sports_centre", "dumbbell"),
    ("fitness_centre", "dumbbell"),
    ("swimming_pool", "person-swimming"),
    ("golf_course", "golf-ball-tee"),
    ("stadium", "futbol"),
    ("supermarket", "cart-shopping"),
    ("convenience", "basket-shopping"),
    ("bakery", "bread-slice"),
    ("butcher", "drumstick-bite"),
    ("kiosk", "newspaper"),
    ("marketplace", "store"),
    ("mall", "bag-shopping"),
    ("clothes", "shirt"),
    ("shoes", "shoe-prints"),
    ("hairdresser", "scissors"),
    ("florist", "seedling"),
    ("books", "book-open"),
    ("electronics", "plug"),
    ("mobile_phone", "mobile-screen"),
    ("hardware", "screwdriver-wrench"),
    ("doityourself", "hammer"),
    ("furniture", "couch"),
    ("optician", "glasses"),
    ("jewelry", "gem"),
    ("gift", "gift"),
    ("laundry", "soap"),
    ("car_repair", "wrench"),
    ("car_wash", "car-on"),
    ("bicycle", "bicycle"),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_builtin_types_are_unique() {
        let set: HashSet<_> = ALL_POI_TYPES.iter().collect();
        assert_eq!(set.len(), ALL_POI_TYPES.len());
    }

    #[test]
    fn test_every_default_belongs_to_the_catalog() {
        for (ty, _) in DEFAULT_ICONS {
            assert!(ALL_POI_TYPES.contains(ty), "{ty} has a default but isn't listed");
        }
    }

    #[test]
    fn test_builtin_leaves_some_types_for_manual_resolution() {
        let catalog = Catalog::builtin();
        let unmapped = catalog
            .poi_types()
            .filter(|ty| !catalog.has_default(ty))
            .count();
        assert!(unmapped > 0);
        assert!(unmapped < catalog.len());
    }

    #[test]
    fn test_default_icon_lookup() {
        let catalog = Catalog::new(
            &["pharmacy", "unicorn_shop"],
            &[("pharmacy", "prescription-bottle")],
        );
        assert_eq!(catalog.default_icon("pharmacy"), Some("prescription-bottle"));
        assert_eq!(catalog.default_icon("unicorn_shop"), None);
    }
}
