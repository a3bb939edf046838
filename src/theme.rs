use serde::{Deserialize, Serialize};

/// Fill used for the root and every cluster that has children.
pub const NO_FILL: &str = "none";

const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const ACCENT: [&str; 8] = [
    "#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f", "#bf5b17", "#666666",
];
const DARK2: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];
const PAIRED: [&str; 12] = [
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f", "#ff7f00",
    "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];
const PASTEL1: [&str; 9] = [
    "#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6", "#ffffcc", "#e5d8bd", "#fddaec",
    "#f2f2f2",
];
const PASTEL2: [&str; 8] = [
    "#b3e2cd", "#fdcdac", "#cbd5e8", "#f4cae4", "#e6f5c9", "#fff2ae", "#f1e2cc", "#cccccc",
];
const SET1: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];
const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];
const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];
const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Categorical color schemes for top-level clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Palette {
    #[serde(alias = "schemeCategory10")]
    Category10,
    #[serde(alias = "schemeAccent")]
    Accent,
    #[serde(alias = "schemeDark2")]
    Dark2,
    #[serde(alias = "schemePaired")]
    Paired,
    #[serde(alias = "schemePastel1")]
    Pastel1,
    #[serde(alias = "schemePastel2")]
    Pastel2,
    #[serde(alias = "schemeSet1")]
    Set1,
    #[serde(alias = "schemeSet2")]
    Set2,
    #[serde(alias = "schemeSet3")]
    Set3,
    #[default]
    #[serde(alias = "schemeTableau10")]
    Tableau10,
}

impl Palette {
    pub fn colors(self) -> &'static [&'static str] {
        match self {
            Palette::Category10 => &CATEGORY10,
            Palette::Accent => &ACCENT,
            Palette::Dark2 => &DARK2,
            Palette::Paired => &PAIRED,
            Palette::Pastel1 => &PASTEL1,
            Palette::Pastel2 => &PASTEL2,
            Palette::Set1 => &SET1,
            Palette::Set2 => &SET2,
            Palette::Set3 => &SET3,
            Palette::Tableau10 => &TABLEAU10,
        }
    }

    /// Color of the `index`-th cluster; wraps around the scheme.
    pub fn color(self, index: usize) -> &'static str {
        let colors = self.colors();
        colors[index % colors.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_cycle() {
        assert_eq!(Palette::Tableau10.color(0), "#4e79a7");
        assert_eq!(Palette::Tableau10.color(10), "#4e79a7");
        assert_eq!(Palette::Accent.color(9), "#beaed4");
    }

    #[test]
    fn scheme_names_deserialize() {
        let palette: Palette = serde_json::from_str("\"schemeSet3\"").expect("alias");
        assert_eq!(palette, Palette::Set3);
        let palette: Palette = serde_json::from_str("\"dark2\"").expect("name");
        assert_eq!(palette, Palette::Dark2);
    }
}
