pub mod car_service;
pub mod article_service;
pub mod comment_service;
