use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{DeminError, Result};

/// One entry of the periodic table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub number: u8,
    pub symbol: &'static str,
    pub name: &'static str,
    /// Standard atomic weight in g/mol; the mass number of the most stable
    /// isotope for elements without one.
    pub mass: f64,
}

const fn el(number: u8, symbol: &'static str, name: &'static str, mass: f64) -> Element {
    Element {
        number,
        symbol,
        name,
        mass,
    }
}

pub static ELEMENTS: [Element; 118] = [
    // --- Period 1 ---
    el(1, "H", "hydrogen", 1.00794),
    el(2, "He", "helium", 4.002602),
    // --- Period 2 ---
    el(3, "Li", "lithium", 6.941),
    el(4, "Be", "beryllium", 9.012182),
    el(5, "B", "boron", 10.811),
    el(6, "C", "carbon", 12.0107),
    el(7, "N", "nitrogen", 14.0067),
    el(8, "O", "oxygen", 15.9994),
    el(9, "F", "fluorine", 18.9984032),
    el(10, "Ne", "neon", 20.1797),
    // --- Period 3 ---
    el(11, "Na", "sodium", 22.98977),
    el(12, "Mg", "magnesium", 24.305),
    el(13, "Al", "aluminum", 26.981538),
    el(14, "Si", "silicon", 28.0855),
    el(15, "P", "phosphorus", 30.973761),
    el(16, "S", "sulfur", 32.065),
    el(17, "Cl", "chlorine", 35.453),
    el(18, "Ar", "argon", 39.948),
    // --- Period 4 ---
    el(19, "K", "potassium", 39.0983),
    el(20, "Ca", "calcium", 40.078),
    el(21, "Sc", "scandium", 44.95591),
    el(22, "Ti", "titanium", 47.867),
    el(23, "V", "vanadium", 50.9415),
    el(24, "Cr", "chromium", 51.9961),
    el(25, "Mn", "manganese", 54.938049),
    el(26, "Fe", "iron", 55.845),
    el(27, "Co", "cobalt", 58.9332),
    el(28, "Ni", "nickel", 58.6934),
    el(29, "Cu", "copper", 63.546),
    el(30, "Zn", "zinc", 65.409),
    el(31, "Ga", "gallium", 69.723),
    el(32, "Ge", "germanium", 72.64),
    el(33, "As", "arsenic", 74.9216),
    el(34, "Se", "selenium", 78.96),
    el(35, "Br", "bromine", 79.904),
    el(36, "Kr", "krypton", 83.798),
    // --- Period 5 ---
    el(37, "Rb", "rubidium", 85.4678),
    el(38, "Sr", "strontium", 87.62),
    el(39, "Y", "yttrium", 88.90585),
    el(40, "Zr", "zirconium", 91.224),
    el(41, "Nb", "niobium", 92.90638),
    el(42, "Mo", "molybdenum", 95.94),
    el(43, "Tc", "technetium", 98.0),
    el(44, "Ru", "ruthenium", 101.07),
    el(45, "Rh", "rhodium", 102.9055),
    el(46, "Pd", "palladium", 106.42),
    el(47, "Ag", "silver", 107.8682),
    el(48, "Cd", "cadmium", 112.411),
    el(49, "In", "indium", 114.818),
    el(50, "Sn", "tin", 118.71),
    el(51, "Sb", "antimony", 121.76),
    el(52, "Te", "tellurium", 127.6),
    el(53, "I", "iodine", 126.90447),
    el(54, "Xe", "xenon", 131.293),
    // --- Period 6 ---
    el(55, "Cs", "cesium", 132.90545),
    el(56, "Ba", "barium", 137.327),
    el(57, "La", "lanthanum", 138.9055),
    el(58, "Ce", "cerium", 140.116),
    el(59, "Pr", "praseodymium", 140.90765),
    el(60, "Nd", "neodymium", 144.24),
    el(61, "Pm", "promethium", 145.0),
    el(62, "Sm", "samarium", 150.36),
    el(63, "Eu", "europium", 151.964),
    el(64, "Gd", "gadolinium", 157.25),
    el(65, "Tb", "terbium", 158.92534),
    el(66, "Dy", "dysprosium", 162.5),
    el(67, "Ho", "holmium", 164.93032),
    el(68, "Er", "erbium", 167.259),
    el(69, "Tm", "thulium", 168.93421),
    el(70, "Yb", "ytterbium", 173.04),
    el(71, "Lu", "lutetium", 174.967),
    el(72, "Hf", "hafnium", 178.49),
    el(73, "Ta", "tantalum", 180.9479),
    el(74, "W", "tungsten", 183.84),
    el(75, "Re", "rhenium", 186.207),
    el(76, "Os", "osmium", 190.23),
    el(77, "Ir", "iridium", 192.217),
    el(78, "Pt", "platinum", 195.078),
    el(79, "Au", "gold", 196.96655),
    el(80, "Hg", "mercury", 200.59),
    el(81, "Tl", "thallium", 204.3833),
    el(82, "Pb", "lead", 207.2),
    el(83, "Bi", "bismuth", 208.98038),
    el(84, "Po", "polonium", 209.0),
    el(85, "At", "astatine", 210.0),
    el(86, "Rn", "radon", 222.0),
    // --- Period 7 ---
    el(87, "Fr", "francium", 223.0),
    el(88, "Ra", "radium", 226.0),
    el(89, "Ac", "actinium", 227.0),
    el(90, "Th", "thorium", 232.0381),
    el(91, "Pa", "protactinium", 231.03588),
    el(92, "U", "uranium", 238.02891),
    el(93, "Np", "neptunium", 237.0),
    el(94, "Pu", "plutonium", 244.0),
    el(95, "Am", "americium", 243.0),
    el(96, "Cm", "curium", 247.0),
    el(97, "Bk", "berkelium", 247.0),
    el(98, "Cf", "californium", 251.0),
    el(99, "Es", "einsteinium", 252.0),
    el(100, "Fm", "fermium", 257.0),
    el(101, "Md", "mendelevium", 258.0),
    el(102, "No", "nobelium", 259.0),
    el(103, "Lr", "lawrencium", 262.0),
    el(104, "Rf", "rutherfordium", 261.0),
    el(105, "Db", "dubnium", 262.0),
    el(106, "Sg", "seaborgium", 266.0),
    el(107, "Bh", "bohrium", 264.0),
    el(108, "Hs", "hassium", 277.0),
    el(109, "Mt", "meitnerium", 268.0),
    el(110, "Ds", "darmstadtium", 281.0),
    el(111, "Rg", "roentgenium", 272.0),
    el(112, "Cn", "copernicium", 285.0),
    el(113, "Nh", "nihonium", 286.0),
    el(114, "Fl", "flerovium", 289.0),
    el(115, "Mc", "moscovium", 290.0),
    el(116, "Lv", "livermorium", 293.0),
    el(117, "Ts", "tennessine", 294.0),
    el(118, "Og", "oganesson", 294.0),
];

fn symbol_index() -> &'static HashMap<&'static str, usize> {
    static INDEX: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let index: HashMap<&'static str, usize> = ELEMENTS
            .iter()
            .enumerate()
            .map(|(i, e)| (e.symbol, i))
            .collect();
        debug_assert_eq!(index.len(), ELEMENTS.len(), "duplicate element symbol");
        index
    })
}

/// Look up an element by its (case-sensitive) symbol.
pub fn element(symbol: &str) -> Result<&'static Element> {
    symbol_index()
        .get(symbol)
        .map(|&i| &ELEMENTS[i])
        .ok_or_else(|| DeminError::UnknownElement(symbol.to_string()))
}

/// Atomic mass of `symbol` in g/mol.
pub fn atomic_mass(symbol: &str) -> Result<f64> {
    element(symbol).map(|e| e.mass)
}
