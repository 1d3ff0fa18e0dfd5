use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "users";
pub const DEVICE_TOKEN_FIELD: &str = "fcm_token";

pub const NOTIFICATION_TITLE: &str = "Rezervasyon Güncellemesi";
pub const NOTIFICATION_BODY: &str = "Durumunuz güncellendi!";

#[derive(Deserialize, Debug)]
pub struct SendNotificationRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UserRecord {
    pub fcm_token: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SendSuccess {
    pub success: bool,
}

#[derive(Serialize, Debug)]
pub struct FcmSendRequest<'a> {
    pub message: FcmMessage<'a>,
}

#[derive(Serialize, Debug)]
pub struct FcmMessage<'a> {
    pub token: &'a str,
    pub notification: FcmNotification<'a>,
}

#[derive(Serialize, Debug)]
pub struct FcmNotification<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> FcmSendRequest<'a> {
    /// The fixed reservation-status notice addressed to one device.
    pub fn status_update(device_token: &'a str) -> Self {
        FcmSendRequest {
            message: FcmMessage {
                token: device_token,
                notification: FcmNotification {
                    title: NOTIFICATION_TITLE,
                    body: NOTIFICATION_BODY,
                },
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub assertion: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}
