//! DAT module kinds and their fixed schemas.

use serde::{Deserialize, Serialize};

const COMM_HEADERS: &[&str] = &[
    "Type", "Version", "Réseau", "Nom", "Equipement", "Type de trame",
    "Caractéristiques", "Quantité", "Lecture/Ecriture",
    "Adresse de début ou hh NETWORK", "Type de données ou mm NETWORK",
    "Période de scrutation (1 ou 0) ou ss NETWORK", "hh ou fff NETWORK",
    "mm ou actif au démarrage NETWORK (1 ou 0)", "ss", "fff",
    "-", "Numéro de DB", "Adresse IP ou 0",
    "Si EQT -> = 0", "--", "0 si NETWORK",
    "0 ou Descritpion si NETWORK", "Description ou 0 si NETWORK",
    "0 si NETWORK ou EQT", "3 si NETWORK", "1 si NETWORK", "Nom du protocole",
];

const EVENT_HEADERS: &[&str] = &[
    "Mode", "Nom", "Description", "00", "0", "Nom de liste serveurs", "Vide",
    "Variable scrutée", "Activation bit (0 = 1>0 ou 1 = 0>1 ou 2 = expression)", "1",
    "Variable bit activation", "Expression (si expression)", "Programme",
    "Branche", "Fonction", "Argument", "=1",
];

const EXPRV_HEADERS: &[&str] = &[
    "Mode", "Nom", "Description", "00", "0", "Nom de liste serveurs", "Vide",
    "1", "Variable activation", "Variable", "Branche", "Expression", "=1",
];

const CYCLIC_HEADERS: &[&str] = &[
    "Mode", "Nom", "Description", "00", "0", "Nom de liste serveurs", "Vide",
    "Nombre de secondes de cycle",
    "1 si bit d'activation 0 sinon",
    "Variable d'activation",
    "Programme", "Branche", "Fonction", "Argument",
    "=0", "=1",
];

const VARTREAT_HEADERS: &[&str] = &[
    "TREATMENT", "GROUPALARM", "Nom", "0", "Nom de liste serveurs",
    "Prise en compte de la population appliquée (0 ou vide)",
    "Description", "Filtre de branche (1 ou 0)", "Filtre de branche (branche)", "Vide 1",
    "Niveau d'alarme min", "Niveau d'alarme max", "Expression",
    "Variable Priorité d'alarme présente acquittée la plus haute",
    "Variable Priorité d'alarme présente non acquittée la plus haute",
    "Vide 2", "Vide 3", "Vide 4", "Nom de la branche",
    "Variable Nombre d'alarmes présentes non acquittées",
    "Variable Nombre d'alarmes présentes acquittées",
    "Variable Nombre d'alarmes présentes (acquittées ou non)",
    "Variable Nombre d'alarmes au repos non acquittées",
    "Variable Nombre d'alarmes au repos",
    "Variable Nombre d'alarmes invalides",
    "Variable Nombre d'alarmes masquées",
    "Variable Nombre d'alarmes masquées par utilisateur",
    "Variable Nombre d'alarmes masquées par programme",
    "Variable Nombre d'alarmes masquées par dépendance sur une autre variable",
    "Variable Nombre d'alarmes masquées par expression",
    "Variable Nombre d'alarmes présentes et en mode prise en compte",
    "Variable Nombre d'alarmes au repos et en mode prise en compte",
    "Nombre d'alarmes inhibées",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatModule {
    Varexp,
    Comm,
    Event,
    Exprv,
    Cyclic,
    Vartreat,
    Other,
}

/// How the first line of a module file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// First line holds the column names and is written back on save
    HeaderRow,
    /// First line is an opaque preamble kept verbatim; columns are fixed
    Preamble,
    /// Data only; columns are fixed
    DataOnly,
}

impl DatModule {
    pub const ALL: [DatModule; 6] = [
        DatModule::Varexp,
        DatModule::Comm,
        DatModule::Event,
        DatModule::Exprv,
        DatModule::Cyclic,
        DatModule::Vartreat,
    ];

    /// Detect the module from a file name keyword (case-insensitive).
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        DatModule::ALL
            .into_iter()
            .find(|m| lower.contains(m.keyword()))
            .unwrap_or(DatModule::Other)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            DatModule::Varexp => "varexp",
            DatModule::Comm => "comm",
            DatModule::Event => "event",
            DatModule::Exprv => "exprv",
            DatModule::Cyclic => "cyclic",
            DatModule::Vartreat => "vartreat",
            DatModule::Other => "",
        }
    }

    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            DatModule::Varexp => Some("varexp.dat"),
            DatModule::Comm => Some("COMM.DAT"),
            DatModule::Event => Some("EVENT.DAT"),
            DatModule::Exprv => Some("Exprv.DAT"),
            DatModule::Cyclic => Some("CYCLIC.DAT"),
            DatModule::Vartreat => Some("VARTREAT.DAT"),
            DatModule::Other => None,
        }
    }

    /// Fixed column names. Empty for varexp (names come from the file) and
    /// for unknown files.
    pub fn default_headers(&self) -> &'static [&'static str] {
        match self {
            DatModule::Comm => COMM_HEADERS,
            DatModule::Event => EVENT_HEADERS,
            DatModule::Exprv => EXPRV_HEADERS,
            DatModule::Cyclic => CYCLIC_HEADERS,
            DatModule::Vartreat => VARTREAT_HEADERS,
            DatModule::Varexp | DatModule::Other => &[],
        }
    }

    pub fn header_rule(&self) -> HeaderRule {
        match self {
            DatModule::Varexp => HeaderRule::HeaderRow,
            DatModule::Comm => HeaderRule::Preamble,
            _ => HeaderRule::DataOnly,
        }
    }

    /// Modules whose records are created from the default header form
    pub fn supports_record_form(&self) -> bool {
        matches!(
            self,
            DatModule::Event | DatModule::Exprv | DatModule::Cyclic | DatModule::Vartreat
        )
    }
}

impl std::fmt::Display for DatModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatModule::Other => write!(f, "generic"),
            m => write!(f, "{}", m.keyword()),
        }
    }
}
