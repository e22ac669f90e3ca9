// src/screens/contacts.rs
//
// Associações de um contato (lead, oportunidade, cliente, conta).
// As funções mexem só no rascunho do formulário; usadas via `FormDialog::edit`.

use crate::models::crm::{Association, ContactPayload, EntityRef};

/// Adiciona um vínculo. O primeiro vínculo do contato já nasce principal.
/// Retorna `false` se o alvo já estava associado.
pub fn add_association(payload: &mut ContactPayload, target: EntityRef) -> bool {
    if payload.associations.iter().any(|a| a.target == target) {
        return false;
    }
    let is_primary = payload.associations.is_empty();
    payload.associations.push(Association { target, is_primary });
    true
}

/// Remove um vínculo. Se era o principal, o próximo da lista assume.
pub fn remove_association(payload: &mut ContactPayload, target: &EntityRef) -> bool {
    let Some(pos) = payload.associations.iter().position(|a| &a.target == target) else {
        return false;
    };
    let removed = payload.associations.remove(pos);
    if removed.is_primary {
        if let Some(first) = payload.associations.first_mut() {
            first.is_primary = true;
        }
    }
    true
}

/// Marca um vínculo como principal e desmarca os demais.
pub fn set_primary(payload: &mut ContactPayload, target: &EntityRef) -> bool {
    if !payload.associations.iter().any(|a| &a.target == target) {
        return false;
    }
    for association in &mut payload.associations {
        association.is_primary = &association.target == target;
    }
    true
}
