//! User-facing messages in the supported languages.

use std::str::FromStr;

/// Language used for prompts and status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Pick a locale from a `LANG`-style value (`zh_CN.UTF-8`, `en_US`, `zh`).
    pub fn detect(lang: Option<&str>) -> Self {
        lang.and_then(|l| l.parse().ok()).unwrap_or_default()
    }

    /// Look up a message.
    pub fn t(self, msg: Msg) -> &'static str {
        match self {
            Self::En => msg.en(),
            Self::Zh => msg.zh(),
        }
    }

    /// Look up a message and substitute `{name}` placeholders.
    pub fn format(self, msg: Msg, args: &[(&str, &str)]) -> String {
        let mut text = self.t(msg).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lang = s.trim().to_ascii_lowercase();
        if lang.starts_with("zh") {
            Ok(Self::Zh)
        } else if lang.starts_with("en") || lang == "c" || lang == "posix" {
            Ok(Self::En)
        } else {
            Err(format!("unsupported language: {}", s))
        }
    }
}

/// Message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    SelectVendor,
    VendorPackycode,
    VendorOther,
    SelectServiceType,
    ServiceTypeApi,
    ServiceTypeCodex,
    InputBaseUrl,
    SelectModel,
    FetchingModels,
    FetchingModelsFailed,
    NoModelsAvailable,
    InputApiKey,
    SavingConfig,
    ConfigSaved,
    ConfigSaveFailed,
    NoConfiguredModels,
    SelectConfiguredModel,
    CurrentModelHint,
    ConfigActionPrompt,
    ConfigActionAdd,
    ConfigActionSelectModel,
    ConfigActionExit,
    Goodbye,
}

impl Msg {
    fn en(self) -> &'static str {
        match self {
            Self::SelectVendor => "Select a vendor",
            Self::VendorPackycode => "PackyCode",
            Self::VendorOther => "Other (custom endpoint)",
            Self::SelectServiceType => "Select a service type",
            Self::ServiceTypeApi => "API (Claude + GPT)",
            Self::ServiceTypeCodex => "Codex (GPT only)",
            Self::InputBaseUrl => "Base URL",
            Self::SelectModel => "Select a model",
            Self::FetchingModels => "Fetching models...",
            Self::FetchingModelsFailed => "Failed to fetch models",
            Self::NoModelsAvailable => "No models available for this vendor",
            Self::InputApiKey => "API key for {provider}",
            Self::SavingConfig => "Saving configuration...",
            Self::ConfigSaved => "Configuration saved",
            Self::ConfigSaveFailed => "Failed to save configuration",
            Self::NoConfiguredModels => "No models configured yet",
            Self::SelectConfiguredModel => "Select the default model",
            Self::CurrentModelHint => "(current)",
            Self::ConfigActionPrompt => "What would you like to do?",
            Self::ConfigActionAdd => "Add or update a provider",
            Self::ConfigActionSelectModel => "Switch default model",
            Self::ConfigActionExit => "Exit",
            Self::Goodbye => "Goodbye!",
        }
    }

    fn zh(self) -> &'static str {
        match self {
            Self::SelectVendor => "选择服务商",
            Self::VendorPackycode => "PackyCode",
            Self::VendorOther => "其他（自定义地址）",
            Self::SelectServiceType => "选择服务类型",
            Self::ServiceTypeApi => "API（Claude + GPT）",
            Self::ServiceTypeCodex => "Codex（仅 GPT）",
            Self::InputBaseUrl => "Base URL",
            Self::SelectModel => "选择模型",
            Self::FetchingModels => "正在获取模型列表...",
            Self::FetchingModelsFailed => "获取模型列表失败",
            Self::NoModelsAvailable => "该服务商没有可用的模型",
            Self::InputApiKey => "输入 {provider} 的 API Key",
            Self::SavingConfig => "正在保存配置...",
            Self::ConfigSaved => "配置已保存",
            Self::ConfigSaveFailed => "保存配置失败",
            Self::NoConfiguredModels => "尚未配置任何模型",
            Self::SelectConfiguredModel => "选择默认模型",
            Self::CurrentModelHint => "（当前）",
            Self::ConfigActionPrompt => "请选择操作",
            Self::ConfigActionAdd => "添加或更新服务商",
            Self::ConfigActionSelectModel => "切换默认模型",
            Self::ConfigActionExit => "退出",
            Self::Goodbye => "再见！",
        }
    }
}
