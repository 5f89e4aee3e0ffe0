use pdbtbx::*;

/// Sequence helpers on [`Residue`].
pub trait ResidueExt {
    /// The residue one-letter code, or `None` if it's not an amino acid.
    fn resn(&self) -> Option<&str>;
}

impl ResidueExt for Residue {
    fn resn(&self) -> Option<&str> {
        let aa_code = match self.name().unwrap_or("").to_uppercase().as_str() {
            "ALA" => "A",
            "ARG" => "R",
            "ASN" => "N",
            "ASP" => "D",
            "CYS" => "C",
            "GLN" => "Q",
            "GLU" => "E",
            "GLY" => "G",
            "HIS" => "H",
            "ILE" => "I",
            "LEU" => "L",
            "LYS" => "K",
            "MET" => "M",
            "PHE" => "F",
            "PRO" => "P",
            "SER" => "S",
            "THR" => "T",
            "TRP" => "W",
            "TYR" => "Y",
            "VAL" => "V",
            _ => "X",
        };

        match aa_code {
            "X" => None,
            _ => Some(aa_code),
        }
    }
}

/// Sequence helpers on [`Chain`].
pub trait ChainExt {
    /// One-letter codes of the chain's amino acids, in file order.
    fn pdb_seq(&self) -> Vec<&str>;
}

impl ChainExt for Chain {
    fn pdb_seq(&self) -> Vec<&str> {
        self.residues().filter_map(|res| res.resn()).collect()
    }
}
