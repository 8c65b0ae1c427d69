use phf::{Map, phf_map};

/// A restriction enzyme as it appears in commercial catalogues.
///
/// `top_cut` and `bottom_cut` count bases from the first base of the site (on
/// the top strand) to the cut on each strand. EcoRI (`G^AATT_C`) cuts at 1
/// and 5; type IIS enzymes such as BsaI cut beyond the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestrictionEnzyme {
    pub name: &'static str,
    pub site: &'static str,
    pub top_cut: i32,
    pub bottom_cut: i32,
}

impl RestrictionEnzyme {
    pub fn site_len(&self) -> usize {
        self.site.len()
    }

    pub fn is_palindromic(&self) -> bool {
        self.site.as_bytes() == reverse_complement(self.site.as_bytes()).as_slice()
    }

    pub fn is_blunt(&self) -> bool {
        self.top_cut == self.bottom_cut
    }
}

macro_rules! enzyme {
    ($name:literal, $site:literal, $top:literal, $bottom:literal) => {
        RestrictionEnzyme {
            name: $name,
            site: $site,
            top_cut: $top,
            bottom_cut: $bottom,
        }
    };
}

/// Enzyme table keyed by lowercase name.
static ENZYMES: Map<&'static str, RestrictionEnzyme> = phf_map! {
    "aatii" => enzyme!("AatII", "GACGTC", 5, 1),
    "acci" => enzyme!("AccI", "GTMKAC", 2, 4),
    "aflii" => enzyme!("AflII", "CTTAAG", 1, 5),
    "agei" => enzyme!("AgeI", "ACCGGT", 1, 5),
    "apai" => enzyme!("ApaI", "GGGCCC", 5, 1),
    "asci" => enzyme!("AscI", "GGCGCGCC", 2, 6),
    "avrii" => enzyme!("AvrII", "CCTAGG", 1, 5),
    "bamhi" => enzyme!("BamHI", "GGATCC", 1, 5),
    "bbsi" => enzyme!("BbsI", "GAAGAC", 8, 12),
    "bglii" => enzyme!("BglII", "AGATCT", 1, 5),
    "bsai" => enzyme!("BsaI", "GGTCTC", 7, 11),
    "bsiwi" => enzyme!("BsiWI", "CGTACG", 1, 5),
    "bsmbi" => enzyme!("BsmBI", "CGTCTC", 7, 11),
    "bsphi" => enzyme!("BspHI", "TCATGA", 1, 5),
    "bsrgi" => enzyme!("BsrGI", "TGTACA", 1, 5),
    "clai" => enzyme!("ClaI", "ATCGAT", 2, 4),
    "dpni" => enzyme!("DpnI", "GATC", 2, 2),
    "eagi" => enzyme!("EagI", "CGGCCG", 1, 5),
    "ecori" => enzyme!("EcoRI", "GAATTC", 1, 5),
    "ecorv" => enzyme!("EcoRV", "GATATC", 3, 3),
    "esp3i" => enzyme!("Esp3I", "CGTCTC", 7, 11),
    "hincii" => enzyme!("HincII", "GTYRAC", 3, 3),
    "hindiii" => enzyme!("HindIII", "AAGCTT", 1, 5),
    "hpai" => enzyme!("HpaI", "GTTAAC", 3, 3),
    "kpni" => enzyme!("KpnI", "GGTACC", 5, 1),
    "mboi" => enzyme!("MboI", "GATC", 0, 4),
    "mfei" => enzyme!("MfeI", "CAATTG", 1, 5),
    "mlui" => enzyme!("MluI", "ACGCGT", 1, 5),
    "ncoi" => enzyme!("NcoI", "CCATGG", 1, 5),
    "ndei" => enzyme!("NdeI", "CATATG", 2, 4),
    "nhei" => enzyme!("NheI", "GCTAGC", 1, 5),
    "noti" => enzyme!("NotI", "GCGGCCGC", 2, 6),
    "nrui" => enzyme!("NruI", "TCGCGA", 3, 3),
    "nsii" => enzyme!("NsiI", "ATGCAT", 5, 1),
    "paci" => enzyme!("PacI", "TTAATTAA", 5, 3),
    "pmei" => enzyme!("PmeI", "GTTTAAAC", 4, 4),
    "psti" => enzyme!("PstI", "CTGCAG", 5, 1),
    "pvui" => enzyme!("PvuI", "CGATCG", 4, 2),
    "pvuii" => enzyme!("PvuII", "CAGCTG", 3, 3),
    "saci" => enzyme!("SacI", "GAGCTC", 5, 1),
    "sacii" => enzyme!("SacII", "CCGCGG", 4, 2),
    "sali" => enzyme!("SalI", "GTCGAC", 1, 5),
    "sapi" => enzyme!("SapI", "GCTCTTC", 8, 11),
    "sau3ai" => enzyme!("Sau3AI", "GATC", 0, 4),
    "scai" => enzyme!("ScaI", "AGTACT", 3, 3),
    "sfii" => enzyme!("SfiI", "GGCCNNNNNGGCC", 8, 5),
    "smai" => enzyme!("SmaI", "CCCGGG", 3, 3),
    "spei" => enzyme!("SpeI", "ACTAGT", 1, 5),
    "sphi" => enzyme!("SphI", "GCATGC", 5, 1),
    "stui" => enzyme!("StuI", "AGGCCT", 3, 3),
    "styi" => enzyme!("StyI", "CCWWGG", 1, 5),
    "swai" => enzyme!("SwaI", "ATTTAAAT", 4, 4),
    "xbai" => enzyme!("XbaI", "TCTAGA", 1, 5),
    "xhoi" => enzyme!("XhoI", "CTCGAG", 1, 5),
    "xmai" => enzyme!("XmaI", "CCCGGG", 1, 5),
};

pub fn lookup(name: &str) -> Option<&'static RestrictionEnzyme> {
    ENZYMES.get(name.trim().to_ascii_lowercase().as_str())
}

/// Every enzyme in the table, sorted by name.
pub fn all() -> Vec<&'static RestrictionEnzyme> {
    let mut enzymes: Vec<_> = ENZYMES.values().collect();
    enzymes.sort_by_key(|e| e.name);
    enzymes
}

const fn iupac_mask(code: u8) -> u8 {
    match code.to_ascii_uppercase() {
        b'A' => 0b0001,
        b'C' => 0b0010,
        b'G' => 0b0100,
        b'T' | b'U' => 0b1000,
        b'R' => 0b0101,
        b'Y' => 0b1010,
        b'S' => 0b0110,
        b'W' => 0b1001,
        b'K' => 0b1100,
        b'M' => 0b0011,
        b'B' => 0b1110,
        b'D' => 0b1101,
        b'H' => 0b1011,
        b'V' => 0b0111,
        b'N' => 0b1111,
        _ => 0,
    }
}

/// Whether a sequence base can be read by a site position. Ambiguous sequence
/// bases only match site codes that cover every base they stand for.
pub fn iupac_matches(site_code: u8, base: u8) -> bool {
    let base_mask = iupac_mask(base);
    base_mask != 0 && base_mask & iupac_mask(site_code) == base_mask
}

pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        other => other,
    }
}

pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}
