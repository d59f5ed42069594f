//! GraphQL documents sent to the Remote Auth API

pub const LOGIN_MUTATION: &str = r#"
mutation Login($input: UsersPermissionsLoginInput!) {
  login(input: $input) {
    jwt
    user {
      id
      username
      email
    }
  }
}
"#;

pub const REGISTER_MUTATION: &str = r#"
mutation Register($input: UsersPermissionsRegisterInput!) {
  register(input: $input) {
    jwt
    user {
      id
      username
      email
      confirmed
      role {
        id
        name
        description
        type
      }
    }
  }
}
"#;

pub const USERS_QUERY: &str = r#"
query {
  userDbs {
    documentId
    Name
    DOB
    email
    phone
    is_active
    createdAt
    updatedAt
    publishedAt
  }
}
"#;
