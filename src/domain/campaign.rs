pub const MAX_CAMPAIGN_IMAGES: usize = 5;

/// One broadcast unit. Lives only for the duration of a single send run and
/// is never persisted.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub subject: String,
    pub message: String,
    pub images: Vec<CampaignImage>,
}

#[derive(Debug, Clone)]
pub struct CampaignImage {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Campaign {
    pub fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("Campaign subject must not be empty.".into());
        }
        if self.message.trim().is_empty() {
            return Err("Campaign message must not be empty.".into());
        }
        if self.images.len() > MAX_CAMPAIGN_IMAGES {
            return Err(format!(
                "A campaign can carry at most {MAX_CAMPAIGN_IMAGES} images."
            ));
        }
        Ok(())
    }
}
