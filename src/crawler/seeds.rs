//! Built-in seed titles for an Ireland crawl

/// Starting frontier, crawled in this order
pub const START_TITLES: &[&str] = &[
    // counties
    "County Galway",
    "County Leitrim",
    "County Mayo",
    "County Roscommon",
    "County Sligo",
    "County Carlow",
    "County Dublin",
    "County Kildare",
    "County Kilkenny",
    "County Laois",
    "County Longford",
    "County Louth",
    "County Meath",
    "County Offaly",
    "County Westmeath",
    "County Wexford",
    "County Wicklow",
    "County Clare",
    "County Cork",
    "County Kerry",
    "County Limerick",
    "County Tipperary",
    "County Waterford",
    "County Cavan",
    "County Donegal",
    "County Monaghan",
    // cities and towns
    "Dublin",
    "Cork (city)",
    "Galway",
    "Limerick (city)",
    "Waterford (city)",
    "Kilkenny (city)",
    "Sligo (town)",
    "Killarney",
    "Dingle",
    "Westport",
    "Bundoran",
    // regions
    "Wild Atlantic Way",
    "Ring of Kerry",
    "Connemara",
    "The Burren",
    "Cliffs of Moher",
    "Giant's Causeway",
    "Skellig Islands",
    // historical sites
    "Rock of Cashel",
    "Newgrange",
    "Hill of Tara",
    "Glendalough",
    "Bunratty Castle",
    "Blarney Castle",
    "Dublin Castle",
    "Kilmainham Gaol",
    // natural attractions
    "Killarney National Park",
    "Connemara National Park",
    "Wicklow Mountains",
    "Glenveagh National Park",
    "Lakes of Killarney",
    "River Shannon",
    // culture
    "Irish culture",
    "Traditional Irish music",
    "Irish cuisine",
    "Irish pub culture",
    "Irish dance",
    "Celtic culture",
    // modern attractions
    "Guinness Storehouse",
    "Titanic Belfast",
    "Trinity College, Dublin",
    "St Patrick's Cathedral, Dublin",
    "Phoenix Park",
    // islands
    "Aran Islands",
    "Achill Island",
    "Skellig Michael",
    "Valentia Island",
    // routes
    "Ireland's Ancient East",
    "Causeway Coastal Route",
    "Slea Head Drive",
    // gardens
    "Powerscourt Gardens",
    "National Botanic Gardens (Ireland)",
    "Muckross House",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seeds_are_unique() {
        let unique: HashSet<_> = START_TITLES.iter().collect();
        assert_eq!(unique.len(), START_TITLES.len());
        assert_eq!(START_TITLES[0], "County Galway");
    }
}
