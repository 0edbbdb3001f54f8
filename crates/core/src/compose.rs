use crate::models::Language;

/// One user-facing message authored in all three variants at the call site;
/// there is no runtime translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trilingual {
    pub en: String,
    pub hi: String,
    pub hinglish: String,
}

impl Trilingual {
    pub fn pick(&self, language: Language) -> String {
        match language {
            Language::En => self.en.clone(),
            Language::Hi => {
                if self.hi.is_empty() {
                    self.en.clone()
                } else {
                    self.hi.clone()
                }
            }
            Language::HiLatn => {
                if !self.hinglish.is_empty() {
                    self.hinglish.clone()
                } else if !self.hi.is_empty() {
                    self.hi.clone()
                } else {
                    self.en.clone()
                }
            }
        }
    }
}

pub fn reply3(
    en: impl Into<String>,
    hi: impl Into<String>,
    hinglish: impl Into<String>,
) -> Trilingual {
    Trilingual {
        en: en.into(),
        hi: hi.into(),
        hinglish: hinglish.into(),
    }
}

pub fn apology(language: Language) -> String {
    reply3(
        "Something went wrong. Please try again.",
        "कुछ गड़बड़ हो गई। कृपया फिर से कोशिश करें।",
        "Kuch gadbad ho gayi. Kripya phir se koshish karein.",
    )
    .pick(language)
}
