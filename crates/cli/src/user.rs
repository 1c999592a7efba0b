use hydrate_engine::{HydrateError, Lazy, entity_schema};
use hydrate_types::FieldDescriptor;
use uuid::Uuid;

/// User assembled from the contact and business sources.
#[derive(Debug, Default)]
pub struct User {
    pub user_name: Option<Lazy<String>>,
    pub key: Option<Lazy<Uuid>>,
    pub user_business_field: Option<Lazy<String>>,
}

entity_schema! {
    User {
        user_name: String => FieldDescriptor::contact("Email"),
        key: Uuid => FieldDescriptor::contact("Id"),
        user_business_field: String => FieldDescriptor::business("InterestingBusinessField"),
    }
}

impl User {
    /// Read every field and format the user for display.
    pub fn render(&self) -> Result<String, HydrateError> {
        Ok(format!(
            "UserName: {}\nID: {}\nUserBusinessField: {}",
            read_or_unset(&self.user_name)?,
            read_or_unset(&self.key)?,
            read_or_unset(&self.user_business_field)?,
        ))
    }
}

fn read_or_unset<T: ToString + 'static>(field: &Option<Lazy<T>>) -> Result<String, HydrateError> {
    match field {
        Some(holder) => Ok(holder.value()?.to_string()),
        None => Ok("<unset>".to_string()),
    }
}
