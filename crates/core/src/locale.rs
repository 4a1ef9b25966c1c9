//! Caller-facing message texts and prompt labels.
//!
//! The Russian catalog matches the wording the intake agent was originally
//! configured against; English is the default.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl std::str::FromStr for Locale {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "ru" | "russian" => Ok(Self::Ru),
            other => {
                Err(ConfigError::Validation(format!("unsupported locale `{other}` (expected en|ru)")))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Messages {
    pub fields_required: &'static str,
    pub api_key_missing: &'static str,
    pub api_key_hint: &'static str,
    pub invalid_api_key: &'static str,
    pub rate_limited: &'static str,
    pub connection_failed: &'static str,
    pub endpoint_not_found: &'static str,
    pub timed_out: &'static str,
    pub processing_failed: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromptLabels {
    pub heading: &'static str,
    pub gender: &'static str,
    pub age: &'static str,
    pub allergies: &'static str,
    pub diagnosis: &'static str,
    pub prescriptions: &'static str,
    pub other: &'static str,
}

const EN_MESSAGES: Messages = Messages {
    fields_required: "All fields are required.",
    api_key_missing: "API key not configured",
    api_key_hint: "Add MISTRAL_API_KEY=your_key to .env",
    invalid_api_key: "Invalid API key",
    rate_limited: "Rate limit exceeded",
    connection_failed: "Could not connect to the API",
    endpoint_not_found: "API endpoint not found",
    timed_out: "The API did not respond in time",
    processing_failed: "An error occurred while processing the request",
};

const RU_MESSAGES: Messages = Messages {
    fields_required: "Все поля обязательны для заполнения.",
    api_key_missing: "API ключ не настроен",
    api_key_hint: "Добавьте MISTRAL_API_KEY=ваш_ключ в .env",
    invalid_api_key: "Неверный API ключ",
    rate_limited: "Превышен лимит запросов",
    connection_failed: "Не удалось подключиться к API",
    endpoint_not_found: "API endpoint не найден",
    timed_out: "API не ответил вовремя",
    processing_failed: "Произошла ошибка при обработке запроса",
};

const EN_LABELS: PromptLabels = PromptLabels {
    heading: "Patient:",
    gender: "Sex",
    age: "Age",
    allergies: "Allergic reactions",
    diagnosis: "Diagnosis",
    prescriptions: "Prescriptions",
    other: "Additional information",
};

const RU_LABELS: PromptLabels = PromptLabels {
    heading: "Пациент:",
    gender: "Пол",
    age: "Возраст",
    allergies: "Аллергические реакции",
    diagnosis: "Диагноз",
    prescriptions: "Назначения",
    other: "Дополнительная информация",
};

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Self::En => &EN_MESSAGES,
            Self::Ru => &RU_MESSAGES,
        }
    }

    pub fn prompt_labels(self) -> &'static PromptLabels {
        match self {
            Self::En => &EN_LABELS,
            Self::Ru => &RU_LABELS,
        }
    }
}
