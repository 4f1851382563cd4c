use super::{ConversionService, CubeService, HeaderService};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    conversion_service: ConversionService,
    cube_service: CubeService,
    header_service: HeaderService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversion_service(&self) -> &ConversionService {
        &self.conversion_service
    }

    pub fn cube_service(&self) -> &CubeService {
        &self.cube_service
    }

    pub fn header_service(&self) -> &HeaderService {
        &self.header_service
    }
}
