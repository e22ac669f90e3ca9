// src/validation.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::common::error::AppError;

// --- ERROS POR CAMPO ---

/// Erros de formulário: nome do campo (camelCase, igual ao JSON) -> primeira
/// regra que falhou.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra o erro do campo, a menos que ele já tenha um.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converte o resultado do `validator`, achatando structs e listas
    /// aninhadas em chaves do tipo `lines[0].quantity`.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut out = Self::new();
        flatten_into(&mut out, "", errors);
        out
    }
}

fn flatten_into(out: &mut FieldErrors, prefix: &str, errors: &ValidationErrors) {
    for (field, kind) in errors.errors() {
        let key = join_key(prefix, &to_camel_case(field));
        match kind {
            ValidationErrorsKind::Field(list) => {
                // O validator guarda na ordem das regras; a primeira é a que vale
                if let Some(first) = list.first() {
                    out.insert(key, describe(first));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_into(out, &key, inner),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_into(out, &format!("{key}[{index}]"), inner);
                }
            }
        }
    }
}

fn join_key(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "required" => "This field is required.".to_string(),
        "email" => "Enter a valid email address.".to_string(),
        "length" => "This field has an invalid length.".to_string(),
        "range" => "This value is out of range.".to_string(),
        other => format!("Invalid value ({other})."),
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

// --- REGRAS ENTRE CAMPOS ---

/// Regras que envolvem mais de um campo (ex: origem != destino).
/// Só rodam depois que todas as regras por campo passaram.
pub trait CrossFieldRules {
    fn check_cross_fields(&self, _errors: &mut FieldErrors) {}
}

/// Validação síncrona do submit: regras por campo e, se todas passarem,
/// as regras entre campos.
pub fn validate_form<P>(payload: &P) -> Result<(), AppError>
where
    P: Validate + CrossFieldRules,
{
    if let Err(errors) = payload.validate() {
        let field_errors = FieldErrors::from_validation(&errors);
        tracing::debug!(campos = field_errors.len(), "validação por campo falhou");
        return Err(AppError::Validation(field_errors));
    }

    let mut cross = FieldErrors::new();
    payload.check_cross_fields(&mut cross);
    if !cross.is_empty() {
        tracing::debug!(campos = cross.len(), "validação entre campos falhou");
        return Err(AppError::Validation(cross));
    }

    Ok(())
}

// ---
// Validações customizadas (usadas via `#[validate(custom(...))]`)
// ---

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

// `length(min = 1)` aceita "   "; para o formulário isso é vazio
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error("required", "This field is required."));
    }
    Ok(())
}

pub fn not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = rule_error("range", "The value cannot be negative.");
        err.add_param("min".into(), &0.0);
        return Err(err);
    }
    Ok(())
}

pub fn positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = rule_error("range", "The value must be greater than zero.");
        err.add_param("min".into(), &0.0);
        return Err(err);
    }
    Ok(())
}

pub fn non_zero(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_zero() {
        return Err(rule_error("non_zero", "The value cannot be zero."));
    }
    Ok(())
}

pub fn percentage(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::ONE_HUNDRED {
        let mut err = rule_error("range", "The value must be between 0 and 100.");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        return Err(err);
    }
    Ok(())
}

// Dígitos, espaços e `+ - ( )`, entre 7 e 20 caracteres
pub fn phone_format(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(7..=20).contains(&trimmed.len()) || digits == 0 {
        return Err(rule_error("phone", "Enter a valid phone number."));
    }
    Ok(())
}
