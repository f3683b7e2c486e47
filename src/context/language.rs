// ============================================================================
// LANGUAGE - Idioma desde el prefijo de la URL + diccionarios embebidos
// ============================================================================

use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    English,
    Arabic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::English, Locale::Arabic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Arabic => "ar",
        }
    }

    /// Parseo estricto, `None` salvo `en` / `ar`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::English),
            "ar" => Some(Locale::Arabic),
            _ => None,
        }
    }

    /// Parseo tolerante, valores desconocidos pasan a inglés
    pub fn from_segment(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Idioma desde el primer segmento: `/ar/login` -> árabe
    pub fn from_path(path: &str) -> Self {
        path.trim_start_matches('/')
            .split(['/', '?', '#'])
            .next()
            .map(Self::from_segment)
            .unwrap_or_default()
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Locale::Arabic)
    }

    pub fn direction(&self) -> TextDirection {
        if self.is_rtl() {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Locale::English => Locale::Arabic,
            Locale::Arabic => Locale::English,
        }
    }

    /// Misma ruta en el otro idioma: `/en/login` -> `/ar/login`
    pub fn switch_path(&self, path: &str) -> String {
        let rest = path.trim_start_matches('/');
        let rest = match rest.split_once('/') {
            Some((first, tail)) if Locale::parse(first).is_some() => tail,
            None if Locale::parse(rest).is_some() => "",
            _ => rest,
        };
        let target = self.other().as_str();
        if rest.is_empty() {
            format!("/{}", target)
        } else {
            format!("/{}/{}", target, rest)
        }
    }

    pub fn home_route(&self) -> String {
        format!("/{}", self.as_str())
    }

    pub fn login_route(&self) -> String {
        format!("/{}/login", self.as_str())
    }
}

// ----------------------------------------------------------------------------
// Diccionarios
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Dictionary {
    pub navbar: NavbarTexts,
    pub home: HomeTexts,
    pub login: LoginTexts,
    pub dashboard: DashboardTexts,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NavbarTexts {
    pub home: String,
    pub logout: String,
    pub switch_language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HomeTexts {
    pub title: String,
    pub subtitle: String,
    pub add_country: String,
    pub edit_country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginTexts {
    pub title: String,
    pub subtitle: String,
    pub username: String,
    pub password: String,
    pub sign_in: String,
    pub loading: String,
    pub placeholders: LoginPlaceholders,
    pub errors: LoginErrors,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginPlaceholders {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoginErrors {
    pub required: String,
    pub invalid_credentials: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardTexts {
    pub countries: String,
    pub flag: String,
    pub country_en: String,
    pub country_ar: String,
    pub price: String,
    pub companies: String,
    pub actions: String,
    pub delete_title: String,
    /// `{country}`
    pub delete_message: String,
    pub cancel: String,
    pub confirm_delete: String,
    /// `{count}`
    pub companies_added: String,
    /// `{providers}`, `{companies}`
    pub providers_updated: String,
}

const EN_JSON: &str = include_str!("../../dictionaries/en.json");
const AR_JSON: &str = include_str!("../../dictionaries/ar.json");

fn parse_dictionary(locale: Locale, raw: &str) -> Option<Dictionary> {
    match serde_json::from_str(raw) {
        Ok(dict) => Some(dict),
        Err(e) => {
            log::error!("❌ [I18N] Diccionario `{}` inválido: {}", locale.as_str(), e);
            None
        }
    }
}

lazy_static! {
    static ref ENGLISH: Dictionary = parse_dictionary(Locale::English, EN_JSON).unwrap_or_default();
    static ref ARABIC: Option<Dictionary> = parse_dictionary(Locale::Arabic, AR_JSON);
}

/// Diccionario de un idioma, inglés si su archivo no se puede parsear
pub fn get_dictionary(locale: Locale) -> &'static Dictionary {
    match locale {
        Locale::English => &*ENGLISH,
        Locale::Arabic => match (*ARABIC).as_ref() {
            Some(dict) => dict,
            None => {
                log::warn!("⚠️ [I18N] Usando inglés por defecto");
                &*ENGLISH
            }
        },
    }
}

/// Misma búsqueda a partir del segmento de la URL
pub fn get_dictionary_for(segment: &str) -> &'static Dictionary {
    get_dictionary(Locale::from_segment(segment))
}

/// Sustituir los `{name}`. Los desconocidos se dejan como están.
pub fn format_template(template: &str, args: &[(&str, String)]) -> String {
    args.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}
