use poem_openapi::Object;
use uuid::Uuid;

#[derive(Object, Debug)]
pub struct RequestSmsOtpDto {
    #[oai(validator(min_length = 1, max_length = 32))]
    pub phone: String,
    #[oai(default)]
    pub captcha_token: String,
    pub template: Option<String>,
}

#[derive(Object, Debug)]
pub struct MarkNotificationsReadDto {
    #[oai(validator(min_items = 1, max_items = 500))]
    pub ids: Vec<Uuid>,
}
