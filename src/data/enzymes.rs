//! Built-in restriction enzyme panel.
//!
//! Recognition sites are given 5'→3' on the top strand, uppercase, using IUPAC
//! codes where the enzyme tolerates ambiguity (`N` = any base, `Y` = C/T,
//! `R` = A/G, `W` = A/T). Sites are the REBASE canonical forms of common
//! cloning enzymes.
//!
//! - Six- and eight-cutters used for routine cloning
//! - Interrupted palindromes (SfiI, BglI) and degenerate sites (AvaI, HincII, StyI)
//! - Type IIS enzymes with asymmetric sites (BsaI, BsmBI), which are searched in
//!   both orientations

use crate::restriction::Enzyme;

pub const ECORI: Enzyme = Enzyme { name: "EcoRI", site: "GAATTC" };
pub const BAMHI: Enzyme = Enzyme { name: "BamHI", site: "GGATCC" };
pub const HINDIII: Enzyme = Enzyme { name: "HindIII", site: "AAGCTT" };
/// Eight-cutter, rare in most genomes.
pub const NOTI: Enzyme = Enzyme { name: "NotI", site: "GCGGCCGC" };
pub const XHOI: Enzyme = Enzyme { name: "XhoI", site: "CTCGAG" };
pub const PSTI: Enzyme = Enzyme { name: "PstI", site: "CTGCAG" };
pub const SMAI: Enzyme = Enzyme { name: "SmaI", site: "CCCGGG" };
pub const KPNI: Enzyme = Enzyme { name: "KpnI", site: "GGTACC" };
pub const SACI: Enzyme = Enzyme { name: "SacI", site: "GAGCTC" };
pub const XBAI: Enzyme = Enzyme { name: "XbaI", site: "TCTAGA" };
pub const SALI: Enzyme = Enzyme { name: "SalI", site: "GTCGAC" };
pub const NCOI: Enzyme = Enzyme { name: "NcoI", site: "CCATGG" };
pub const NDEI: Enzyme = Enzyme { name: "NdeI", site: "CATATG" };
pub const BGLII: Enzyme = Enzyme { name: "BglII", site: "AGATCT" };
pub const SPEI: Enzyme = Enzyme { name: "SpeI", site: "ACTAGT" };
/// Blunt cutter.
pub const ECORV: Enzyme = Enzyme { name: "EcoRV", site: "GATATC" };
pub const APAI: Enzyme = Enzyme { name: "ApaI", site: "GGGCCC" };
pub const NHEI: Enzyme = Enzyme { name: "NheI", site: "GCTAGC" };
pub const CLAI: Enzyme = Enzyme { name: "ClaI", site: "ATCGAT" };
pub const MLUI: Enzyme = Enzyme { name: "MluI", site: "ACGCGT" };
pub const ASCI: Enzyme = Enzyme { name: "AscI", site: "GGCGCGCC" };
pub const PACI: Enzyme = Enzyme { name: "PacI", site: "TTAATTAA" };

/// Interrupted palindrome, 5 wildcard bases.
pub const SFII: Enzyme = Enzyme { name: "SfiI", site: "GGCCNNNNNGGCC" };
pub const BGLI: Enzyme = Enzyme { name: "BglI", site: "GCCNNNNNGGC" };
pub const AVAI: Enzyme = Enzyme { name: "AvaI", site: "CYCGRG" };
pub const HINCII: Enzyme = Enzyme { name: "HincII", site: "GTYRAC" };
pub const STYI: Enzyme = Enzyme { name: "StyI", site: "CCWWGG" };

/// Type IIS; cuts outside its site.
pub const BSAI: Enzyme = Enzyme { name: "BsaI", site: "GGTCTC" };
pub const BSMBI: Enzyme = Enzyme { name: "BsmBI", site: "CGTCTC" };

/// Default panel used when no enzyme list is configured.
pub const PANEL: &[Enzyme] = &[
    ECORI, BAMHI, HINDIII, NOTI, XHOI, PSTI, SMAI, KPNI, SACI, XBAI, SALI, NCOI, NDEI, BGLII, SPEI,
    ECORV, APAI, NHEI, CLAI, MLUI, ASCI, PACI, SFII, BGLI, AVAI, HINCII, STYI, BSAI, BSMBI,
];

/// Case-insensitive lookup by enzyme name.
pub fn by_name(name: &str) -> Option<&'static Enzyme> {
    PANEL.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}
