//! Seed data for the mock API
//!
//! Ten users with ten posts each, mirroring the shape of the public
//! fake-data service.

use serde_json::{json, Value};

/// Posts seeded per user
pub const POSTS_PER_USER: u64 = 10;

const USERS: [(&str, &str, &str); 10] = [
    ("Leanne Graham", "Bret", "Sincere@april.biz"),
    ("Ervin Howell", "Antonette", "Shanna@melissa.tv"),
    ("Clementine Bauch", "Samantha", "Nathan@yesenia.net"),
    ("Patricia Lebsack", "Karianne", "Julianne.OConner@kory.org"),
    ("Chelsey Dietrich", "Kamren", "Lucio_Hettinger@annie.ca"),
    ("Mrs. Dennis Schulist", "Leopoldo_Corkery", "Karley_Dach@jasper.info"),
    ("Kurtis Weissnat", "Elwyn.Skiles", "Telly.Hoeger@billy.biz"),
    ("Nicholas Runolfsdottir V", "Maxime_Nienow", "Sherwood@rosamond.me"),
    ("Glenna Reichert", "Delphine", "Chaim_McDermott@dana.io"),
    ("Clementina DuBuque", "Moriah.Stanton", "Rey.Padberg@karina.biz"),
];

/// Which collection a route addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Posts,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Posts => "posts",
        }
    }
}

/// Read-only record store; writes are acknowledged but never applied
#[derive(Debug, Clone)]
pub struct Store {
    users: Vec<Value>,
    posts: Vec<Value>,
}

impl Store {
    /// The standard seeded data set
    pub fn seeded() -> Self {
        let users = USERS
            .iter()
            .zip(1u64..)
            .map(|((name, username, email), id)| {
                json!({
                    "id": id,
                    "name": name,
                    "username": username,
                    "email": email,
                    "website": format!("{}.example.org", username.to_lowercase()),
                })
            })
            .collect();

        let posts = (1..=USERS.len() as u64 * POSTS_PER_USER)
            .map(|id| {
                let user_id = (id - 1) / POSTS_PER_USER + 1;
                json!({
                    "userId": user_id,
                    "id": id,
                    "title": format!("post {id} by user {user_id}"),
                    "body": format!("body of post {id}"),
                })
            })
            .collect();

        Self { users, posts }
    }

    pub fn all(&self, resource: Resource) -> &[Value] {
        match resource {
            Resource::Users => &self.users,
            Resource::Posts => &self.posts,
        }
    }

    pub fn find(&self, resource: Resource, id: u64) -> Option<&Value> {
        self.all(resource)
            .iter()
            .find(|record| record["id"].as_u64() == Some(id))
    }

    /// Id the next created record would receive
    pub fn next_id(&self, resource: Resource) -> u64 {
        self.all(resource).len() as u64 + 1
    }

    pub fn posts_by_user(&self, user_id: u64) -> Vec<Value> {
        self.posts
            .iter()
            .filter(|post| post["userId"].as_u64() == Some(user_id))
            .cloned()
            .collect()
    }
}
