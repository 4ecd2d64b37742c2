pub type AirportTable = &'static [(&'static str, &'static [&'static str])];

pub static CITY_AIRPORTS: AirportTable = &[
    ("new york", &["JFK", "LGA", "EWR"]),
    ("los angeles", &["LAX"]),
    ("san francisco", &["SFO", "OAK", "SJC"]),
    ("chicago", &["ORD", "MDW"]),
    ("washington", &["IAD", "DCA", "BWI"]),
    ("boston", &["BOS"]),
    ("seattle", &["SEA"]),
    ("miami", &["MIA", "FLL"]),
    ("orlando", &["MCO"]),
    ("atlanta", &["ATL"]),
    ("dallas", &["DFW", "DAL"]),
    ("houston", &["IAH", "HOU"]),
    ("denver", &["DEN"]),
    ("las vegas", &["LAS"]),
    ("honolulu", &["HNL"]),
    ("toronto", &["YYZ", "YTZ"]),
    ("vancouver", &["YVR"]),
    ("montreal", &["YUL"]),
    ("mexico city", &["MEX"]),
    ("cancun", &["CUN"]),
    ("london", &["LHR", "LGW", "STN", "LTN"]),
    ("paris", &["CDG", "ORY"]),
    ("amsterdam", &["AMS"]),
    ("frankfurt", &["FRA"]),
    ("munich", &["MUC"]),
    ("berlin", &["BER"]),
    ("madrid", &["MAD"]),
    ("barcelona", &["BCN"]),
    ("lisbon", &["LIS"]),
    ("rome", &["FCO", "CIA"]),
    ("milan", &["MXP", "LIN"]),
    ("venice", &["VCE"]),
    ("zurich", &["ZRH"]),
    ("vienna", &["VIE"]),
    ("prague", &["PRG"]),
    ("dublin", &["DUB"]),
    ("copenhagen", &["CPH"]),
    ("stockholm", &["ARN"]),
    ("oslo", &["OSL"]),
    ("helsinki", &["HEL"]),
    ("athens", &["ATH"]),
    ("istanbul", &["IST", "SAW"]),
    ("dubai", &["DXB"]),
    ("doha", &["DOH"]),
    ("cairo", &["CAI"]),
    ("johannesburg", &["JNB"]),
    ("cape town", &["CPT"]),
    ("nairobi", &["NBO"]),
    ("delhi", &["DEL"]),
    ("mumbai", &["BOM"]),
    ("bangkok", &["BKK", "DMK"]),
    ("singapore", &["SIN"]),
    ("kuala lumpur", &["KUL"]),
    ("jakarta", &["CGK"]),
    ("manila", &["MNL"]),
    ("hong kong", &["HKG"]),
    ("shanghai", &["PVG", "SHA"]),
    ("beijing", &["PEK", "PKX"]),
    ("seoul", &["ICN", "GMP"]),
    ("tokyo", &["NRT", "HND"]),
    ("osaka", &["KIX", "ITM"]),
    ("sydney", &["SYD"]),
    ("melbourne", &["MEL"]),
    ("auckland", &["AKL"]),
    ("sao paulo", &["GRU", "CGH"]),
    ("rio de janeiro", &["GIG", "SDU"]),
    ("buenos aires", &["EZE", "AEP"]),
    ("lima", &["LIM"]),
    ("bogota", &["BOG"]),
];

pub fn is_airport_code(input: &str) -> bool {
    input.len() == 3 && input.chars().all(|c| c.is_ascii_alphabetic())
}

#[derive(Debug, Clone, Copy)]
pub struct AirportResolver {
    table: AirportTable,
}

impl Default for AirportResolver {
    fn default() -> Self {
        Self::with_table(CITY_AIRPORTS)
    }
}

impl AirportResolver {
    pub fn with_table(table: AirportTable) -> Self {
        Self { table }
    }

    fn find_entry(&self, needle: &str) -> Option<&'static (&'static str, &'static [&'static str])> {
        self.table
            .iter()
            .find(|(city, _)| needle.contains(city) || city.contains(needle))
    }

    /// Substring match in table order; the first city that contains the input,
    /// or is contained in it, wins.
    pub fn resolve(&self, input: &str) -> Option<String> {
        let trimmed = input.trim();
        if is_airport_code(trimmed) {
            return Some(trimmed.to_ascii_uppercase());
        }

        let needle = trimmed.to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let resolved = self
            .find_entry(&needle)
            .and_then(|(_, codes)| codes.first())
            .map(|code| code.to_string());
        tracing::debug!(input = trimmed, code = ?resolved, "resolved airport");
        resolved
    }

    pub fn candidates(&self, input: &str) -> Option<(String, Vec<String>)> {
        let trimmed = input.trim();
        if is_airport_code(trimmed) {
            let code = trimmed.to_ascii_uppercase();
            return Some((code.clone(), vec![code]));
        }

        let needle = trimmed.to_lowercase();
        if needle.is_empty() {
            return None;
        }

        self.find_entry(&needle).map(|(city, codes)| {
            (
                city.to_string(),
                codes.iter().map(|c| c.to_string()).collect(),
            )
        })
    }
}
