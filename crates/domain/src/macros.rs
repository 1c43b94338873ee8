//! 識別子と検証付き文字列の newtype を生成するマクロ

/// UUID を包む ID 型を定義する
///
/// 生成されるもの: `new()`（v4 で採番）、`from_uuid()`、`as_uuid()`、
/// `Display`（ハイフン付き小文字）、serde では素の UUID 文字列として扱う。
///
/// ```rust
/// use mailhub_domain::resource::ResourceId;
///
/// let id = ResourceId::new();
/// assert_eq!(ResourceId::from_uuid(*id.as_uuid()), id);
/// assert_eq!(id.to_string().len(), 36);
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// INSERT 前にアプリケーション側で採番する
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }
    };
}

/// 前後の空白を除いた必須文字列の型を定義する
///
/// `label` はエラーメッセージにそのまま入る（例: `"key is required"`）。
/// 長さは文字数で数える。
///
/// ```rust
/// use mailhub_domain::resource::LangCode;
///
/// assert_eq!(LangCode::new("  ja ").unwrap().as_str(), "ja");
/// assert!(LangCode::new("   ").is_err());
/// ```
macro_rules! define_validated_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:literal,
            max_length: $max_length:literal $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value = value.into();
                let value = value.trim();

                if value.is_empty() {
                    return Err($crate::DomainError::Validation(
                        concat!($label, " is required").to_string(),
                    ));
                }
                if value.chars().count() > $max_length {
                    return Err($crate::DomainError::Validation(
                        concat!($label, " must be at most ", $max_length, " characters").to_string(),
                    ));
                }

                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
