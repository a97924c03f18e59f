//! Source text emitted by the endpoint generator

use super::EndpointSpec;

pub fn controller_function(spec: &EndpointSpec) -> String {
    format!(
        r#"
export const {function} = async (req: Request, res: Response): Promise<void> => {{
  // Replace with the real {function} logic
  const data = req.body || {{}};

  res.status({status}).json({{
    message: '{function} executed successfully',
    data: data,
    timestamp: new Date().toISOString()
  }});
}};
"#,
        function = spec.function,
        status = spec.method.success_status(),
    )
}

pub fn controller_file(spec: &EndpointSpec) -> String {
    format!(
        "import {{ Request, Response }} from 'express';\n{}",
        controller_function(spec)
    )
}

pub fn route_line(spec: &EndpointSpec) -> String {
    format!(
        "router.{}('{}', {}.{});",
        spec.method.router_fn(),
        spec.router_path(),
        spec.controller_name(),
        spec.function
    )
}

pub fn routes_file(spec: &EndpointSpec) -> String {
    format!(
        r#"import express from 'express';
import * as {controller} from '../controllers/{controller}';

const router = express.Router();

{route}

export default router;
"#,
        controller = spec.controller_name(),
        route = route_line(spec),
    )
}

pub fn handler_function(spec: &EndpointSpec) -> String {
    format!(
        r#"
export const {handler} = async (
  event: APIGatewayProxyEvent,
  context: Context
): Promise<APIGatewayProxyResult> => {{
  return awsServerlessExpress.proxy(server, event, context, 'PROMISE').promise;
}};
"#,
        handler = spec.handler_fn(),
    )
}

pub fn handler_file(spec: &EndpointSpec) -> String {
    format!(
        r#"import {{ APIGatewayProxyEvent, APIGatewayProxyResult, Context }} from 'aws-lambda';
import awsServerlessExpress from 'aws-serverless-express';
import app from '../app';

const server = awsServerlessExpress.createServer(app);
{}"#,
        handler_function(spec)
    )
}

/// SAM resource block, indented to sit under `Resources:`
pub fn sam_function(spec: &EndpointSpec, build_dir: &str) -> String {
    format!(
        r#"
  {lambda}:
    Type: AWS::Serverless::Function
    Properties:
      CodeUri: ./{build_dir}/{service}/
      Handler: handlers/{module}.{handler}
      Role: !GetAtt LambdaExecutionRole.Arn
      Events:
        {event}:
          Type: Api
          Properties:
            RestApiId: !Ref ApiGatewayApi
            Path: {route}
            Method: {method}
"#,
        lambda = spec.lambda_name(),
        build_dir = build_dir.trim_matches('/'),
        service = spec.service,
        module = spec.handler_module(),
        handler = spec.handler_fn(),
        event = spec.event_name(),
        route = spec.route,
        method = spec.method,
    )
}

pub fn entry_import(spec: &EndpointSpec) -> String {
    format!(
        "import {routes} from './routes/{routes}';",
        routes = spec.routes_name()
    )
}

pub fn entry_mount(spec: &EndpointSpec) -> String {
    format!("app.use('/{}', {});", spec.service, spec.routes_name())
}
