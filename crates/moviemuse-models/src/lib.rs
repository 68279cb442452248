pub mod credits;
pub mod identity;
pub mod movie;
pub mod page;
pub mod review;
pub mod video;
pub mod watchlist;

pub use credits::{CastMember, Credits, CrewMember};
pub use identity::UserIdentity;
pub use movie::{Genre, Movie, MovieDetails, ProductionCompany, ProductionCountry, SpokenLanguage};
pub use page::Page;
pub use review::{Review, ReviewAuthor};
pub use video::Video;
pub use watchlist::WatchlistRecord;
